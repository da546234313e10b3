//! Stand-in for the headless CLI backend, for manual end-to-end runs
//! without a real installation.
//!
//! Point `backend.command` at this binary. It accepts (and ignores) the
//! flags the proxy passes, reads the prompt from stdin, and prints one
//! JSON reply in the CLI's `--output-format json` shape.
//!
//! Scenario selection via environment:
//!   MOCK_CLAUDE_SCENARIO=text   (default) plain text reply
//!   MOCK_CLAUDE_SCENARIO=tool   reply containing a fenced tool_use block
//!   MOCK_CLAUDE_SCENARIO=error  exit 1 with a message on stderr

use std::io::Read;

use serde_json::json;

fn main() {
    let mut prompt = String::new();
    let _ = std::io::stdin().read_to_string(&mut prompt);

    let scenario = std::env::var("MOCK_CLAUDE_SCENARIO").unwrap_or_else(|_| "text".to_string());

    match scenario.as_str() {
        "error" => {
            eprintln!("mock backend failure");
            std::process::exit(1);
        }
        "tool" => {
            let text = format!(
                "Let me look that up.\n```tool_use\n{}\n```",
                json!({"name": "get_weather", "input": {"city": "SF"}})
            );
            print_reply(&text, prompt.chars().count() as u64);
        }
        _ => {
            let text = format!("Mock reply to a {}-char prompt.", prompt.chars().count());
            print_reply(&text, prompt.chars().count() as u64);
        }
    }
}

fn print_reply(text: &str, input_tokens: u64) {
    let reply = json!({
        "type": "result",
        "subtype": "success",
        "is_error": false,
        "result": text,
        "usage": {
            "input_tokens": input_tokens,
            "output_tokens": text.chars().count() as u64,
        }
    });
    println!("{reply}");
}
