use log::debug;
use pz_core::{
    FlagScope, LocalData, Node, NodeData, NodeId, NodeState, OptionItem, PuzzleError,
    PuzzleState, ResponseAction, TextCheck, TextInputResponse, UserResponse,
};
use regex::{Regex, RegexBuilder};

use super::lifecycle::PuzzleEngine;
use super::step::option_available;
use crate::{FlagStore, UidGenerator};

impl PuzzleEngine {
    /// Applies one user response to the node at `response.node_index()`.
    ///
    /// History after that node is dropped, the node's data is rewritten, and
    /// if the response leads somewhere the stepper extends the path from there
    /// with the local data in effect at the answered node. Text drafts are the
    /// exception: they rewrite the typed value and keep the rest of the path.
    pub async fn process(
        &self,
        state: &PuzzleState,
        response: &UserResponse,
    ) -> Result<PuzzleState, PuzzleError> {
        let node_index = response.node_index();
        let Some(answered) = state.node_states.get(node_index) else {
            return Err(PuzzleError::new(
                "ENGINE_NODE_INDEX",
                format!(
                    "Response targets node index {} but only {} nodes are on the path.",
                    node_index,
                    state.node_states.len()
                ),
            ));
        };
        let node = self.puzzle.node(&answered.node_id)?;
        debug!(
            "process {} response at index {} (\"{}\")",
            response.type_name(),
            node_index,
            answered.node_id
        );

        if let (
            UserResponse::Text {
                value,
                is_enter: false,
                ..
            },
            Node::TextInput { .. },
        ) = (response, node)
        {
            let mut node_states = state.node_states.clone();
            node_states[node_index] = NodeState {
                node_data: NodeData::TextInput {
                    value: value.clone(),
                    response: previous_response(&answered.node_data),
                },
                ..answered.clone()
            };
            return Ok(PuzzleState {
                next_state_uid: state.next_state_uid,
                node_states,
            });
        }

        let mut uids = UidGenerator::new(state.next_state_uid);
        let mut node_states = state.node_states[..=node_index].to_vec();
        let mut next_local = answered.local_data.clone();
        let mut next_node_id: Option<NodeId> = None;

        let node_data = match (response, node) {
            (
                UserResponse::Text {
                    value,
                    is_enter: true,
                    ..
                },
                Node::TextInput {
                    responses,
                    fallthrough_response,
                    ..
                },
            ) => {
                let action = match match_text_response(responses, value)? {
                    Some(action) => action.clone(),
                    None => ResponseAction::Message {
                        message: fallthrough_response.clone(),
                    },
                };
                NodeData::TextInput {
                    value: value.clone(),
                    response: apply_action(action, &mut next_node_id),
                }
            }
            (UserResponse::Option { value, .. }, Node::OptionInput { options, .. }) => {
                let option = options.get(*value).ok_or_else(|| {
                    PuzzleError::at_node(
                        "ENGINE_OPTION_INDEX",
                        format!(
                            "Option index {} is out of range ({} options).",
                            value,
                            options.len()
                        ),
                        answered.node_id.clone(),
                    )
                })?;
                if !option_answerable(&self.flags, option, &answered.local_data)? {
                    return Err(PuzzleError::at_node(
                        "ENGINE_OPTION_HIDDEN",
                        format!("Option {} is not currently offered.", value),
                        answered.node_id.clone(),
                    ));
                }
                if let Some(one_use_flag) = &option.one_use_flag {
                    next_local = self.flags.set(one_use_flag, true, &next_local)?;
                }
                next_node_id = Some(option.goto.clone());
                NodeData::OptionInput {
                    value: Some(*value),
                }
            }
            (
                UserResponse::ClickImage {
                    click_x, click_y, ..
                },
                Node::ClickImageInput {
                    click_map,
                    click_actions,
                    fallthrough_response,
                    ..
                },
            ) => {
                let color = self
                    .pixels
                    .pixel_color(click_map, *click_x, *click_y)
                    .await?;
                let action = click_actions
                    .get(&color)
                    .or_else(|| {
                        click_actions
                            .iter()
                            .find(|(key, _)| key.eq_ignore_ascii_case(&color))
                            .map(|(_, action)| action)
                    })
                    .cloned();
                let response = match action {
                    Some(action) => apply_action(action, &mut next_node_id),
                    None => Some(fallthrough_response.clone()),
                };
                NodeData::ClickImageInput {
                    click_x: *click_x,
                    click_y: *click_y,
                    response,
                }
            }
            (response, node) => {
                return Err(PuzzleError::at_node(
                    "ENGINE_RESPONSE_MISMATCH",
                    format!(
                        "A \"{}\" response cannot answer a \"{}\" node.",
                        response.type_name(),
                        node.type_name()
                    ),
                    answered.node_id.clone(),
                ));
            }
        };

        node_states[node_index] = NodeState {
            node_data,
            ..answered.clone()
        };

        if let Some(next_node_id) = next_node_id {
            node_states.extend(self.step(&next_node_id, next_local, &mut uids)?);
        }

        Ok(PuzzleState {
            next_state_uid: uids.peek(),
            node_states,
        })
    }
}

/// Whether an option may be picked at an answered snapshot. Global one-use
/// flags are not part of the snapshot, so going back to an earlier option
/// node still accepts an option whose global one-use flag was set later.
fn option_answerable(
    flags: &FlagStore,
    option: &OptionItem,
    local: &LocalData,
) -> Result<bool, PuzzleError> {
    match &option.one_use_flag {
        Some(one_use_flag) if one_use_flag.scope == FlagScope::Global => {
            let without_one_use = OptionItem {
                one_use_flag: None,
                ..option.clone()
            };
            option_available(flags, &without_one_use, local)
        }
        _ => option_available(flags, option, local),
    }
}

fn previous_response(node_data: &NodeData) -> Option<String> {
    match node_data {
        NodeData::TextInput { response, .. } => response.clone(),
        _ => None,
    }
}

/// Message actions become the node's response; goto actions clear it and
/// set the next node.
fn apply_action(action: ResponseAction, next_node_id: &mut Option<NodeId>) -> Option<String> {
    match action {
        ResponseAction::Message { message } => Some(message),
        ResponseAction::Goto { goto } => {
            *next_node_id = Some(goto);
            None
        }
    }
}

/// First rule in declared order whose check accepts `value`.
fn match_text_response<'a>(
    responses: &'a [TextInputResponse],
    value: &str,
) -> Result<Option<&'a ResponseAction>, PuzzleError> {
    for rule in responses {
        if text_check_matches(&rule.check, value)? {
            return Ok(Some(&rule.action));
        }
    }
    Ok(None)
}

fn text_check_matches(check: &TextCheck, value: &str) -> Result<bool, PuzzleError> {
    match check {
        TextCheck::String {
            string,
            is_case_sensitive: true,
        } => Ok(string == value),
        TextCheck::String {
            string,
            is_case_sensitive: false,
        } => Ok(string.to_lowercase() == value.to_lowercase()),
        TextCheck::Regex { regex, regex_flags } => {
            Ok(compile_regex(regex, regex_flags.as_deref().unwrap_or(""))?.is_match(value))
        }
    }
}

/// Builds a regex from an authored pattern and JavaScript-style flags.
fn compile_regex(pattern: &str, flags: &str) -> Result<Regex, PuzzleError> {
    let mut builder = RegexBuilder::new(pattern);
    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'u' => {
                builder.unicode(true);
            }
            // Stateful matching flags have no effect on a single test.
            'g' | 'y' => {}
            other => {
                return Err(PuzzleError::new(
                    "ENGINE_REGEX_INVALID",
                    format!("Unsupported regex flag \"{}\" on /{}/.", other, pattern),
                ));
            }
        }
    }
    builder.build().map_err(|error| {
        PuzzleError::new(
            "ENGINE_REGEX_INVALID",
            format!("Regex /{}/ does not compile: {}", pattern, error),
        )
    })
}

#[cfg(test)]
mod respond_tests {
    use super::*;

    #[test]
    fn regex_flags_follow_javascript_letters() {
        assert!(compile_regex("^open$", "i")
            .expect("compile")
            .is_match("OPEN"));
        assert!(!compile_regex("^open$", "")
            .expect("compile")
            .is_match("OPEN"));
        assert!(compile_regex("^b$", "gm")
            .expect("compile")
            .is_match("a\nb"));
        assert_eq!(
            compile_regex("a", "x").expect_err("bad flag").code,
            "ENGINE_REGEX_INVALID"
        );
        assert_eq!(
            compile_regex("(", "").expect_err("bad pattern").code,
            "ENGINE_REGEX_INVALID"
        );
    }

    #[test]
    fn lookaround_and_backreferences_are_rejected_at_match_time() {
        assert_eq!(
            compile_regex("^(?=.*key)", "").expect_err("lookahead").code,
            "ENGINE_REGEX_INVALID"
        );
        assert_eq!(
            text_check_matches(
                &TextCheck::Regex {
                    regex: r"^(a)\1$".to_string(),
                    regex_flags: None,
                },
                "aa",
            )
            .expect_err("backreference")
            .code,
            "ENGINE_REGEX_INVALID"
        );
    }

    #[test]
    fn first_matching_rule_wins() {
        let responses = vec![
            TextInputResponse {
                check: TextCheck::Regex {
                    regex: "^kn".to_string(),
                    regex_flags: None,
                },
                action: ResponseAction::Message {
                    message: "first".to_string(),
                },
            },
            TextInputResponse {
                check: TextCheck::String {
                    string: "knife".to_string(),
                    is_case_sensitive: true,
                },
                action: ResponseAction::Goto {
                    goto: "end".to_string(),
                },
            },
        ];

        let action = match_text_response(&responses, "knife").expect("match");
        assert_eq!(
            action,
            Some(&ResponseAction::Message {
                message: "first".to_string()
            })
        );
        assert_eq!(match_text_response(&responses, "rope").expect("match"), None);
    }
}
