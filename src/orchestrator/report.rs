//! Text printed at the end of a deployment

use std::fmt::Write;

use crate::config::StackConfig;

/// Endpoint URLs of both services
pub fn endpoints(config: &StackConfig) -> String {
    format!(
        "Open WebUI:  {}\nOllama API:  {}\n",
        config.webui.host_url(),
        config.ollama.host_url()
    )
}

/// Follow-up commands for day-to-day operation
pub fn commands(config: &StackConfig, binary: &str) -> String {
    let ollama = &config.ollama.name;
    let webui = &config.webui.name;

    let rows = [
        ("Web UI logs", format!("{} logs -f {}", binary, webui)),
        ("Ollama logs", format!("{} logs -f {}", binary, ollama)),
        (
            "Pull a model",
            format!("{} exec -it {} ollama pull <model>", binary, ollama),
        ),
        (
            "List models",
            format!("{} exec -it {} ollama list", binary, ollama),
        ),
        ("Stop", format!("{} stop {} {}", binary, webui, ollama)),
        ("Start", format!("{} start {} {}", binary, ollama, webui)),
        ("Remove", "ollama-stack down".to_string()),
    ];

    let mut out = String::new();
    for (label, command) in rows {
        // Writing to a String cannot fail
        let _ = writeln!(out, "  {:<14}{}", format!("{}:", label), command);
    }
    out
}
