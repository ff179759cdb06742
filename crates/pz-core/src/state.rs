use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::NodeId;

/// Per-playthrough data threaded through the node sequence by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalData {
    #[serde(default)]
    pub flags: BTreeMap<String, bool>,
}

impl LocalData {
    pub fn flag(&self, key: &str) -> Option<bool> {
        self.flags.get(key).copied()
    }

    /// Returns a copy with `key` set; `self` is left untouched.
    pub fn with_flag(&self, key: &str, value: bool) -> Self {
        let mut flags = self.flags.clone();
        flags.insert(key.to_string(), value);
        Self { flags }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum NodeData {
    Empty,
    TextInput {
        value: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<String>,
    },
    OptionInput {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<usize>,
    },
    #[serde(rename_all = "camelCase")]
    ClickImageInput {
        click_x: i64,
        click_y: i64,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        response: Option<String>,
    },
    #[serde(rename_all = "camelCase")]
    Penalty { time_start: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeState {
    pub uid: u64,
    pub node_id: NodeId,
    pub local_data: LocalData,
    pub node_data: NodeData,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PuzzleState {
    pub next_state_uid: u64,
    pub node_states: Vec<NodeState>,
}

impl PuzzleState {
    pub fn last(&self) -> Option<&NodeState> {
        self.node_states.last()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.node_states.len().checked_sub(1)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum UserResponse {
    #[serde(rename_all = "camelCase")]
    Text {
        node_index: usize,
        value: String,
        /// False for keystroke drafts, true once the answer is submitted.
        is_enter: bool,
    },
    #[serde(rename_all = "camelCase")]
    Option { node_index: usize, value: usize },
    #[serde(rename_all = "camelCase")]
    ClickImage {
        node_index: usize,
        click_x: i64,
        click_y: i64,
    },
}

impl UserResponse {
    pub fn node_index(&self) -> usize {
        match self {
            Self::Text { node_index, .. }
            | Self::Option { node_index, .. }
            | Self::ClickImage { node_index, .. } => *node_index,
        }
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Option { .. } => "option",
            Self::ClickImage { .. } => "click-image",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum PuzzlePenalty {
    #[serde(rename_all = "camelCase")]
    KickToStart { content: String, time_end: u64 },
}

impl PuzzlePenalty {
    pub fn time_end(&self) -> u64 {
        match self {
            Self::KickToStart { time_end, .. } => *time_end,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::KickToStart { content, .. } => content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn with_flag_leaves_original_untouched() {
        let base = LocalData::default().with_flag("door", true);
        let next = base.with_flag("key", false);

        assert_eq!(base.flag("key"), None);
        assert_eq!(next.flag("door"), Some(true));
        assert_eq!(next.flag("key"), Some(false));
    }

    #[test]
    fn user_response_wire_format_matches_host_events() {
        let response: UserResponse = serde_json::from_str(
            r#"{ "type": "click-image", "nodeIndex": 2, "clickX": 10, "clickY": 4 }"#,
        )
        .expect("click response should parse");
        assert_eq!(response.node_index(), 2);
        assert_eq!(response.type_name(), "click-image");

        let text: UserResponse = serde_json::from_str(
            r#"{ "type": "text", "nodeIndex": 0, "value": "open", "isEnter": true }"#,
        )
        .expect("text response should parse");
        assert!(matches!(text, UserResponse::Text { is_enter: true, .. }));
    }

    #[test]
    fn node_state_serializes_tagged_node_data() {
        let state = NodeState {
            uid: 3,
            node_id: "ask".to_string(),
            local_data: LocalData::default(),
            node_data: NodeData::ClickImageInput {
                click_x: -1,
                click_y: -1,
                response: None,
            },
        };
        let value = serde_json::to_value(&state).expect("serialize");
        assert_eq!(value["nodeId"], "ask");
        assert_eq!(value["nodeData"]["kind"], "click-image-input");
        assert_eq!(value["nodeData"]["clickX"], -1);
        assert!(value["nodeData"].get("response").is_none());
    }
}
