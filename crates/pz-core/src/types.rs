use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::PuzzleError;

pub type NodeId = String;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Puzzle {
    pub start_node: NodeId,
    pub nodes: BTreeMap<NodeId, Node>,
}

impl Puzzle {
    pub fn node(&self, node_id: &str) -> Result<&Node, PuzzleError> {
        self.nodes.get(node_id).ok_or_else(|| {
            PuzzleError::at_node(
                "ENGINE_NODE_NOT_FOUND",
                format!("Node \"{}\" is not defined in the puzzle.", node_id),
                node_id,
            )
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagScope {
    Local,
    Global,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Flag {
    #[serde(rename = "type")]
    pub scope: FlagScope,
    pub key: String,
}

impl Flag {
    pub fn local(key: impl Into<String>) -> Self {
        Self {
            scope: FlagScope::Local,
            key: key.into(),
        }
    }

    pub fn global(key: impl Into<String>) -> Self {
        Self {
            scope: FlagScope::Global,
            key: key.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum TextCheck {
    #[serde(rename_all = "camelCase")]
    String {
        string: String,
        #[serde(default)]
        is_case_sensitive: bool,
    },
    #[serde(rename_all = "camelCase")]
    Regex {
        regex: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        regex_flags: Option<String>,
    },
}

/// Outcome attached to a matched text answer or a mapped click color.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ResponseAction {
    Message { message: String },
    Goto { goto: NodeId },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextInputResponse {
    pub check: TextCheck,
    pub action: ResponseAction,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionItem {
    pub label: String,
    pub goto: NodeId,
    /// Only offered once this flag is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub show_flag: Option<Flag>,
    /// Hidden for good once this flag is set; wins over `show_flag`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub one_use_flag: Option<Flag>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Node {
    Html {
        content: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        goto: Option<NodeId>,
    },
    #[serde(rename_all = "camelCase")]
    TextInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        prompt: Option<String>,
        #[serde(default)]
        responses: Vec<TextInputResponse>,
        fallthrough_response: String,
    },
    #[serde(rename_all = "camelCase")]
    OptionInput {
        options: Vec<OptionItem>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        fallthrough_goto: Option<NodeId>,
    },
    #[serde(rename_all = "camelCase")]
    ClickImageInput {
        prompt: String,
        image: String,
        click_map: String,
        #[serde(default)]
        click_actions: BTreeMap<String, ResponseAction>,
        fallthrough_response: String,
    },
    Goto {
        goto: NodeId,
    },
    SetFlag {
        flag: Flag,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<bool>,
        goto: NodeId,
    },
    #[serde(rename_all = "camelCase")]
    CheckFlag {
        flag: Flag,
        goto_if_true: NodeId,
        goto_if_false: NodeId,
    },
    PenaltyKickToStart {
        content: String,
        /// Milliseconds the host blocks input for, counted from `timeStart`.
        delay: u64,
    },
    SetCompletedFlag {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        goto: Option<NodeId>,
    },
}

impl Node {
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Html { .. } => "html",
            Self::TextInput { .. } => "text-input",
            Self::OptionInput { .. } => "option-input",
            Self::ClickImageInput { .. } => "click-image-input",
            Self::Goto { .. } => "goto",
            Self::SetFlag { .. } => "set-flag",
            Self::CheckFlag { .. } => "check-flag",
            Self::PenaltyKickToStart { .. } => "penalty-kick-to-start",
            Self::SetCompletedFlag { .. } => "set-completed-flag",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn puzzle_json_uses_authoring_field_names() {
        let raw = r#"{
            "startNode": "intro",
            "nodes": {
                "intro": { "type": "html", "content": "<p>Hi</p>", "goto": "ask" },
                "ask": {
                    "type": "text-input",
                    "prompt": "Name?",
                    "responses": [
                        {
                            "check": { "type": "string", "string": "OPEN", "isCaseSensitive": false },
                            "action": { "type": "goto", "goto": "done" }
                        },
                        {
                            "check": { "type": "regex", "regex": "^cl", "regexFlags": "i" },
                            "action": { "type": "message", "message": "Close." }
                        }
                    ],
                    "fallthroughResponse": "No."
                },
                "pick": {
                    "type": "option-input",
                    "options": [
                        { "label": "A", "goto": "done", "oneUseFlag": { "type": "local", "key": "a" } }
                    ],
                    "fallthroughGoto": "done"
                },
                "flag": { "type": "set-flag", "flag": { "type": "global", "key": "seen" }, "goto": "done" },
                "penalty": { "type": "penalty-kick-to-start", "content": "Wait", "delay": 3000 },
                "done": { "type": "set-completed-flag" }
            }
        }"#;

        let puzzle: Puzzle = serde_json::from_str(raw).expect("puzzle should parse");
        assert_eq!(puzzle.start_node, "intro");
        assert_eq!(puzzle.nodes.len(), 6);

        let Node::TextInput { responses, .. } = &puzzle.nodes["ask"] else {
            panic!("ask should be a text input");
        };
        assert_eq!(
            responses[0].check,
            TextCheck::String {
                string: "OPEN".to_string(),
                is_case_sensitive: false,
            }
        );

        let Node::OptionInput { options, .. } = &puzzle.nodes["pick"] else {
            panic!("pick should be an option input");
        };
        assert_eq!(options[0].one_use_flag, Some(Flag::local("a")));
        assert_eq!(options[0].show_flag, None);

        let Node::SetFlag { flag, value, .. } = &puzzle.nodes["flag"] else {
            panic!("flag should be a set-flag node");
        };
        assert_eq!(flag.scope, FlagScope::Global);
        assert_eq!(*value, None);
        assert_eq!(puzzle.nodes["done"].type_name(), "set-completed-flag");
    }

    #[test]
    fn unknown_node_type_is_rejected_at_load() {
        let raw = r#"{ "startNode": "a", "nodes": { "a": { "type": "teleport", "goto": "b" } } }"#;
        assert!(serde_json::from_str::<Puzzle>(raw).is_err());
    }

    #[test]
    fn missing_node_lookup_reports_node_id() {
        let puzzle = Puzzle {
            start_node: "a".to_string(),
            nodes: BTreeMap::new(),
        };
        let error = puzzle.node("a").expect_err("missing node");
        assert_eq!(error.code, "ENGINE_NODE_NOT_FOUND");
        assert_eq!(error.node_id.as_deref(), Some("a"));
    }
}
