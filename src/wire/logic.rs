use crate::logic::node::LogicNode;
use crate::logic::term::{Relation, Term};
use serde::{Deserialize, Serialize};

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum TermJson {
    QuantifiedVariable { spelling: String },
    Constant { spelling: String },
    Function { spelling: String, arguments: Vec<Term> },
}

impl From<Term> for TermJson {
    fn from(term: Term) -> Self {
        match term {
            Term::Var(spelling) => Self::QuantifiedVariable { spelling },
            Term::Const(spelling) => Self::Constant { spelling },
            Term::Fun(spelling, arguments) => Self::Function { spelling, arguments },
        }
    }
}

impl From<TermJson> for Term {
    fn from(json: TermJson) -> Self {
        match json {
            TermJson::QuantifiedVariable { spelling } => Self::Var(spelling),
            TermJson::Constant { spelling } => Self::Const(spelling),
            TermJson::Function { spelling, arguments } => Self::Fun(spelling, arguments),
        }
    }
}

#[derive(Clone, Serialize, Deserialize)]
pub struct RelationJson {
    spelling: String,
    arguments: Vec<Term>,
}

impl From<Relation> for RelationJson {
    fn from(relation: Relation) -> Self {
        let spelling = relation.name;
        let arguments = relation.args;
        Self {
            spelling,
            arguments,
        }
    }
}

impl From<RelationJson> for Relation {
    fn from(json: RelationJson) -> Self {
        Relation::new(json.spelling, json.arguments)
    }
}

#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum NodeJson {
    Var {
        spelling: String,
    },
    Not {
        child: Box<LogicNode>,
    },
    And {
        #[serde(rename = "leftChild")]
        left: Box<LogicNode>,
        #[serde(rename = "rightChild")]
        right: Box<LogicNode>,
    },
    Or {
        #[serde(rename = "leftChild")]
        left: Box<LogicNode>,
        #[serde(rename = "rightChild")]
        right: Box<LogicNode>,
    },
    Impl {
        #[serde(rename = "leftChild")]
        left: Box<LogicNode>,
        #[serde(rename = "rightChild")]
        right: Box<LogicNode>,
    },
    Equiv {
        #[serde(rename = "leftChild")]
        left: Box<LogicNode>,
        #[serde(rename = "rightChild")]
        right: Box<LogicNode>,
    },
    Relation {
        spelling: String,
        arguments: Vec<Term>,
    },
    #[serde(rename = "allquant")]
    All {
        #[serde(rename = "varName")]
        variable: String,
        child: Box<LogicNode>,
    },
    #[serde(rename = "exquant")]
    Ex {
        #[serde(rename = "varName")]
        variable: String,
        child: Box<LogicNode>,
    },
}

impl From<LogicNode> for NodeJson {
    fn from(node: LogicNode) -> Self {
        match node {
            LogicNode::Var(spelling) => Self::Var { spelling },
            LogicNode::Not(child) => Self::Not { child },
            LogicNode::And(left, right) => Self::And { left, right },
            LogicNode::Or(left, right) => Self::Or { left, right },
            LogicNode::Impl(left, right) => Self::Impl { left, right },
            LogicNode::Equiv(left, right) => Self::Equiv { left, right },
            LogicNode::Relation(relation) => Self::Relation {
                spelling: relation.name,
                arguments: relation.args,
            },
            LogicNode::All(variable, child) => Self::All { variable, child },
            LogicNode::Ex(variable, child) => Self::Ex { variable, child },
        }
    }
}

impl From<NodeJson> for LogicNode {
    fn from(json: NodeJson) -> Self {
        match json {
            NodeJson::Var { spelling } => Self::Var(spelling),
            NodeJson::Not { child } => Self::Not(child),
            NodeJson::And { left, right } => Self::And(left, right),
            NodeJson::Or { left, right } => Self::Or(left, right),
            NodeJson::Impl { left, right } => Self::Impl(left, right),
            NodeJson::Equiv { left, right } => Self::Equiv(left, right),
            NodeJson::Relation {
                spelling,
                arguments,
            } => Self::Relation(Relation::new(spelling, arguments)),
            NodeJson::All { variable, child } => Self::All(variable, child),
            NodeJson::Ex { variable, child } => Self::Ex(variable, child),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::logic::node::LogicNode;
    use crate::logic::parse::parse_first_order;
    use crate::logic::term::Term;
    use serde_json::json;

    #[test]
    fn node_shape() {
        let formula = parse_first_order("\\all X: (R(X, f(a)) -> !Q(X))").unwrap();
        let value = serde_json::to_value(&formula).unwrap();
        assert_eq!(value["type"], "allquant");
        assert_eq!(value["varName"], "X");
        assert_eq!(value["child"]["type"], "impl");
        let relation = &value["child"]["leftChild"];
        assert_eq!(relation["spelling"], "R");
        assert_eq!(relation["arguments"][0], json!({"type": "QuantifiedVariable", "spelling": "X"}));
        assert_eq!(relation["arguments"][1]["type"], "Function");
        assert_eq!(value["child"]["rightChild"]["type"], "not");

        let decoded: LogicNode = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, formula);
    }

    #[test]
    fn unknown_tag_is_rejected() {
        let value = json!({"type": "xor", "leftChild": {"type": "var", "spelling": "a"}});
        assert!(serde_json::from_value::<LogicNode>(value).is_err());
        assert!(serde_json::from_value::<Term>(json!({"type": "Constant"})).is_err());
    }
}
