pub(crate) use crate::util::block::Block;
pub(crate) use crate::util::id::Id;
