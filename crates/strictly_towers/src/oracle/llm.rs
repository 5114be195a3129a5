//! LLM-backed oracle using a single `move_disk` tool.

use super::{Oracle, OracleError};
use crate::context::{Context, Exchange};
use crate::llm_client::{ChatTurn, LlmClient, LlmReply, ToolCall, ToolSpec};
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{Value, json};
use std::collections::BTreeMap;
use std::str::FromStr;
use strictly_hanoi::{Move, Peg};
use tracing::{debug, info, instrument, warn};

const TOOL_NAME: &str = "move_disk";

/// Arguments of the `move_disk` tool.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, JsonSchema)]
pub struct MoveDiskArgs {
    /// The source tower (A, B, or C)
    pub source: String,
    /// The target tower (A, B, or C)
    pub target: String,
}

impl MoveDiskArgs {
    /// Converts the raw tower names into a typed move.
    pub fn to_move(&self) -> Result<Move, OracleError> {
        let peg = |name: &str| {
            Peg::from_str(name.trim())
                .map_err(|_| OracleError::Unparsable(format!("unknown tower {name:?}")))
        };
        Ok(Move::new(peg(&self.source)?, peg(&self.target)?))
    }
}

/// The `move_disk` tool definition, with its schema derived from [`MoveDiskArgs`].
pub(crate) fn move_disk_tool() -> ToolSpec {
    let mut parameters = serde_json::to_value(schemars::schema_for!(MoveDiskArgs))
        .unwrap_or_else(|_| json!({ "type": "object" }));
    if let Some(schema) = parameters.as_object_mut() {
        schema.remove("$schema");
        schema.remove("title");
    }
    ToolSpec {
        name: TOOL_NAME.to_string(),
        description: "Move a disk from one tower to another in the Tower of Hanoi puzzle"
            .to_string(),
        parameters,
    }
}

/// Oracle that asks a language model for each move.
#[derive(Debug, Clone)]
pub struct LlmOracle {
    name: String,
    client: LlmClient,
    system_prompt: String,
    tool: ToolSpec,
    /// Free text the model sent, keyed by the context length when it was asked.
    replies: BTreeMap<usize, String>,
}

impl LlmOracle {
    /// Creates an oracle for a puzzle of `num_disks` disks going from `start` to `goal`.
    #[instrument(skip(client), fields(model = %client.config().model()))]
    pub fn new(client: LlmClient, num_disks: u32, start: Peg, goal: Peg) -> Self {
        info!("Creating LLM oracle");
        Self {
            name: client.config().model().to_string(),
            client,
            system_prompt: system_prompt(num_disks, start, goal),
            tool: move_disk_tool(),
            replies: BTreeMap::new(),
        }
    }

    /// The system prompt sent with every request.
    pub fn system_prompt(&self) -> &str {
        &self.system_prompt
    }
}

fn system_prompt(num_disks: u32, start: Peg, goal: Peg) -> String {
    format!(
        "You are an expert at solving the Tower of Hanoi puzzle.\n\
         Your task is to solve a {num_disks}-disk Tower of Hanoi puzzle by moving \
         disks from Tower {start} to Tower {goal}.\n\n\
         Remember the rules:\n\
         1. Only one disk can be moved at a time\n\
         2. Each move consists of taking the upper disk from one of the stacks and \
         placing it on top of another stack or an empty rod\n\
         3. Bigger disk can't be placed on top of a smaller disk\n\n\
         Use the {TOOL_NAME} tool to make exactly one move per turn.\n\n\
         Please solve the puzzle as quick as possible. If the minimum number of \
         moves is already surpassed, proceed anyway."
    )
}

/// Rebuilds the provider transcript from the session context.
///
/// Every proposal becomes an assistant tool call followed by its result, so
/// the model sees its own moves and the verdict on each. Text the model sent
/// goes back as an assistant turn right after the state it answered.
fn transcript(context: &Context, replies: &BTreeMap<usize, String>) -> Vec<ChatTurn> {
    let mut turns = Vec::with_capacity(context.len() * 2 + replies.len());
    let mut calls = 0usize;
    for (index, entry) in context.entries().iter().enumerate() {
        match entry {
            Exchange::State { .. } | Exchange::NoProposal { .. } => {
                turns.push(ChatTurn::User(entry.to_string()));
            }
            Exchange::Accepted { mv, .. } | Exchange::Rejected { mv, .. } => {
                calls += 1;
                let call_id = format!("call_{calls}");
                turns.push(ChatTurn::AssistantToolCall(ToolCall {
                    id: call_id.clone(),
                    name: TOOL_NAME.to_string(),
                    arguments: json!({
                        "source": mv.source.to_string(),
                        "target": mv.destination.to_string(),
                    }),
                }));
                turns.push(ChatTurn::ToolResult {
                    call_id,
                    content: entry.to_string(),
                });
            }
        }
        if let Some(text) = replies.get(&(index + 1)) {
            turns.push(ChatTurn::AssistantText(text.clone()));
        }
    }
    turns
}

/// Extracts the proposed move from a reply.
fn proposal(reply: LlmReply) -> Result<Move, OracleError> {
    let mut calls = reply.tool_calls.into_iter();
    let Some(call) = calls.next() else {
        let text = reply.text.unwrap_or_else(|| "empty reply".to_string());
        return Err(OracleError::Declined(text));
    };
    let extra = calls.count();
    if extra > 0 {
        warn!(extra, "Ignoring additional tool calls in one reply");
    }

    if call.name != TOOL_NAME {
        return Err(OracleError::Unparsable(format!("unknown tool {:?}", call.name)));
    }

    let args: MoveDiskArgs = match call.arguments {
        Value::Object(_) => serde_json::from_value(call.arguments)
            .map_err(|e| OracleError::Unparsable(format!("bad {TOOL_NAME} arguments: {e}")))?,
        other => {
            return Err(OracleError::Unparsable(format!(
                "bad {TOOL_NAME} arguments: {other}"
            )));
        }
    };
    args.to_move()
}

#[async_trait::async_trait]
impl Oracle for LlmOracle {
    #[instrument(skip(self, context), fields(oracle = %self.name, entries = context.len()))]
    async fn propose(&mut self, context: &Context) -> Result<Move, OracleError> {
        let turns = transcript(context, &self.replies);
        debug!(turns = turns.len(), "Asking model for a move");

        let reply = self
            .client
            .complete(&self.system_prompt, &turns, &self.tool)
            .await
            .map_err(|e| OracleError::Unavailable(e.message))?;

        if let Some(text) = &reply.text {
            self.replies.insert(context.len(), text.clone());
        }
        let result = proposal(reply);
        match &result {
            Ok(mv) => debug!(%mv, "Model proposed a move"),
            Err(e) => warn!(error = %e, "Model produced no usable move"),
        }
        result
    }

    fn name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::describe_state;
    use strictly_hanoi::{Disk, IllegalMove, Puzzle};

    fn reply_with(arguments: Value) -> LlmReply {
        LlmReply {
            text: None,
            tool_calls: vec![ToolCall {
                id: "call_1".to_string(),
                name: TOOL_NAME.to_string(),
                arguments,
            }],
        }
    }

    #[test]
    fn test_tool_schema_requires_both_towers() {
        let tool = move_disk_tool();
        assert_eq!(tool.name, "move_disk");
        assert_eq!(tool.parameters["type"], "object");
        let required = tool.parameters["required"].as_array().unwrap();
        assert!(required.contains(&json!("source")));
        assert!(required.contains(&json!("target")));
        assert!(tool.parameters.get("$schema").is_none());
    }

    #[test]
    fn test_proposal_parses_lowercase_towers() {
        let mv = proposal(reply_with(json!({ "source": "a", "target": " c " }))).unwrap();
        assert_eq!(mv, Move::new(Peg::A, Peg::C));
    }

    #[test]
    fn test_proposal_rejects_unknown_tower() {
        let err = proposal(reply_with(json!({ "source": "A", "target": "D" }))).unwrap_err();
        assert!(matches!(err, OracleError::Unparsable(_)));
    }

    #[test]
    fn test_proposal_rejects_missing_field() {
        let err = proposal(reply_with(json!({ "source": "A" }))).unwrap_err();
        assert!(matches!(err, OracleError::Unparsable(_)));
    }

    #[test]
    fn test_proposal_rejects_raw_string_arguments() {
        let err = proposal(reply_with(Value::String("A to C".to_string()))).unwrap_err();
        assert!(matches!(err, OracleError::Unparsable(_)));
    }

    #[test]
    fn test_text_only_reply_is_declined() {
        let reply = LlmReply {
            text: Some("I think we should move A to C".to_string()),
            tool_calls: Vec::new(),
        };
        assert_eq!(
            proposal(reply),
            Err(OracleError::Declined("I think we should move A to C".to_string()))
        );
    }

    #[test]
    fn test_transcript_pairs_calls_with_results() {
        let puzzle = Puzzle::new(2).unwrap();
        let mut context = Context::new();
        context.push(Exchange::State {
            iteration: 1,
            description: describe_state(&puzzle.snapshot()),
        });
        context.push(Exchange::Rejected {
            mv: Move::new(Peg::B, Peg::C),
            reason: IllegalMove::EmptySource(Peg::B),
        });
        context.push(Exchange::State {
            iteration: 2,
            description: describe_state(&puzzle.snapshot()),
        });
        context.push(Exchange::Accepted {
            mv: Move::new(Peg::A, Peg::B),
            disk: Disk::new(1),
        });

        let turns = transcript(&context, &BTreeMap::new());
        assert_eq!(turns.len(), 6);
        assert!(matches!(&turns[0], ChatTurn::User(text) if text.contains("Tower A: [1, 2]")));
        match (&turns[1], &turns[2]) {
            (ChatTurn::AssistantToolCall(call), ChatTurn::ToolResult { call_id, content }) => {
                assert_eq!(&call.id, call_id);
                assert_eq!(call.arguments["source"], "B");
                assert!(content.starts_with("Invalid move"));
            }
            other => panic!("unexpected turns: {other:?}"),
        }
        assert!(matches!(&turns[5], ChatTurn::ToolResult { call_id, .. } if call_id == "call_2"));
    }

    #[test]
    fn test_transcript_replays_model_text_as_assistant() {
        let puzzle = Puzzle::new(2).unwrap();
        let mut context = Context::new();
        context.push(Exchange::State {
            iteration: 1,
            description: describe_state(&puzzle.snapshot()),
        });
        context.push(Exchange::NoProposal {
            reason: OracleError::Declined("I would move A to C".to_string()).to_string(),
        });
        context.push(Exchange::State {
            iteration: 2,
            description: describe_state(&puzzle.snapshot()),
        });
        let replies = BTreeMap::from([(1, "I would move A to C".to_string())]);

        let turns = transcript(&context, &replies);
        assert_eq!(turns.len(), 4);
        assert!(matches!(&turns[0], ChatTurn::User(text) if text.starts_with("Current state")));
        assert_eq!(
            turns[1],
            ChatTurn::AssistantText("I would move A to C".to_string())
        );
        assert!(matches!(&turns[2], ChatTurn::User(text) if text.starts_with("No move was made")));
        assert!(matches!(&turns[3], ChatTurn::User(text) if text.starts_with("Current state")));
    }

    #[test]
    fn test_model_text_precedes_its_tool_call() {
        let mut context = Context::new();
        context.push(Exchange::State {
            iteration: 1,
            description: describe_state(&Puzzle::new(1).unwrap().snapshot()),
        });
        context.push(Exchange::Accepted {
            mv: Move::new(Peg::A, Peg::C),
            disk: Disk::new(1),
        });
        let replies = BTreeMap::from([(1, "Moving the only disk.".to_string())]);

        let turns = transcript(&context, &replies);
        assert_eq!(turns.len(), 4);
        assert!(matches!(&turns[1], ChatTurn::AssistantText(_)));
        assert!(matches!(&turns[2], ChatTurn::AssistantToolCall(_)));
        assert!(matches!(&turns[3], ChatTurn::ToolResult { .. }));
    }

    #[test]
    fn test_system_prompt_names_pegs_and_size() {
        let prompt = system_prompt(4, Peg::A, Peg::C);
        assert!(prompt.contains("4-disk"));
        assert!(prompt.contains("from Tower A to Tower C"));
        assert!(prompt.contains("move_disk"));
    }
}
