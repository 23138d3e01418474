use serde::Serialize;
use std::sync::OnceLock;

static QUIET: OnceLock<bool> = OnceLock::new();

pub fn is_quiet() -> bool {
    *QUIET.get_or_init(|| {
        std::env::var("WFMARKET_QUIET")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false)
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputMode {
    Human,
    Json,
}

impl OutputMode {
    pub fn from_flag(json: bool) -> Self {
        if json { OutputMode::Json } else { OutputMode::Human }
    }

    pub fn is_human(&self) -> bool {
        matches!(self, OutputMode::Human)
    }
}

#[derive(Debug, Serialize)]
struct Envelope<'a, T: Serialize> {
    ok: bool,
    command: &'a str,
    data: T,
}

/// Render the JSON envelope for a command; `ok` is false when the command
/// ran but found a problem (e.g. schema drift)
pub fn envelope_json<T: Serialize>(command: &str, ok: bool, data: T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(&Envelope { ok, command, data })
}

fn emit<T: Serialize>(mode: OutputMode, command: &str, ok: bool, data: T) -> anyhow::Result<()> {
    if mode == OutputMode::Json {
        println!("{}", envelope_json(command, ok, data)?);
    }
    Ok(())
}

/// Print the `ok: true` envelope; a no-op in human mode
pub fn emit_success<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    emit(mode, command, true, data)
}

/// Print the `ok: false` envelope; a no-op in human mode
pub fn emit_failure<T: Serialize>(mode: OutputMode, command: &str, data: T) -> anyhow::Result<()> {
    emit(mode, command, false, data)
}
