use clap::Parser;
use serde::Serialize;

#[derive(Debug, Default, Parser, Serialize)]
pub struct Cli {
    /// Port the HTTP server listens on
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    /// One of TRACE, DEBUG, INFO, WARN, ERROR
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace_level: Option<String>,
    /// Public URL pinged periodically to keep the host awake
    #[arg(long)]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub self_ping_url: Option<String>,
}
