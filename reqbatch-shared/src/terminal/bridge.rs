//! # Scripting Host Bridge Terminal
//!
//! Drives the ERP GUI scripting host through a bridge process. The bridge owns
//! the host-side object model (windows, grids, toolbar buttons); this adapter
//! speaks one JSON object per line over the child's stdin/stdout.
//!
//! ## Protocol
//!
//! ```text
//! -> {"command":"connect"}
//! <- {"ok":true}
//! -> {"command":"set_field","row":0,"field":"MATNR","value":"100-200"}
//! <- {"ok":true}
//! -> {"command":"read_status_bar"}
//! <- {"ok":true,"severity":"E","text":"Material 100-200 does not exist"}
//! -> {"command":"dismiss_dialog"}
//! <- {"ok":true,"dismissed":false}
//! <- {"ok":false,"error":"control not found"}     (any command may fault)
//! ```
//!
//! Every reply must arrive within `terminal.response_timeout_ms`. A bridge
//! that stalls past it leaves the line protocol out of step, so the session
//! is closed and later calls fail with [`TerminalError::Closed`].

use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info, warn};

use super::{FieldKey, Severity, StatusBar, TransactionTerminal};
use crate::config::TerminalConfig;
use crate::errors::{TerminalError, TerminalResult};

/// Host grid column for each requisition field
pub fn host_field_code(field: FieldKey) -> &'static str {
    match field {
        FieldKey::AccountAssignment => "KNTTP",
        FieldKey::Site => "NAME1",
        FieldKey::Material => "MATNR",
        FieldKey::Quantity => "MENGE",
        FieldKey::UnitPrice => "PREIS",
        FieldKey::DeliveryDate => "EEIND",
        FieldKey::RequisitionGroup => "EKGRP",
        FieldKey::Currency => "WAERS",
    }
}

/// Map a host message type to a severity; `E` and `A` (abort) are errors
pub fn severity_from_host_code(code: &str) -> Severity {
    match code.trim().to_ascii_uppercase().as_str() {
        "E" | "A" => Severity::Error,
        "S" => Severity::Success,
        _ => Severity::Other,
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "command", rename_all = "snake_case")]
enum BridgeRequest<'a> {
    Connect,
    OpenTransaction {
        code: &'a str,
    },
    SetField {
        row: usize,
        field: &'static str,
        value: &'a str,
    },
    Validate,
    Commit,
    ReadStatusBar,
    DismissDialog,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    ok: bool,
    #[serde(default)]
    severity: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    dismissed: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Terminal backed by a scripting host bridge child process
pub struct BridgeTerminal {
    child: Child,
    stdin: ChildStdin,
    responses: Lines<BufReader<ChildStdout>>,
    response_timeout: Duration,
    closed: bool,
}

impl std::fmt::Debug for BridgeTerminal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BridgeTerminal")
            .field("pid", &self.child.id())
            .field("closed", &self.closed)
            .finish()
    }
}

impl BridgeTerminal {
    /// Start the bridge process and attach to the host session
    pub async fn spawn(config: &TerminalConfig) -> TerminalResult<Self> {
        let mut child = Command::new(&config.program)
            .args(&config.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| TerminalError::Protocol("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| TerminalError::Protocol("bridge stdout unavailable".to_string()))?;

        let mut terminal = Self {
            child,
            stdin,
            responses: BufReader::new(stdout).lines(),
            response_timeout: config.response_timeout(),
            closed: false,
        };
        terminal.call(BridgeRequest::Connect).await?;

        info!(
            program = %config.program,
            pid = terminal.child.id(),
            "Connected to scripting host bridge"
        );
        Ok(terminal)
    }

    async fn call(&mut self, request: BridgeRequest<'_>) -> TerminalResult<BridgeResponse> {
        if self.closed {
            return Err(TerminalError::Closed);
        }
        let mut line = serde_json::to_string(&request)
            .map_err(|e| TerminalError::Protocol(format!("failed to encode request: {e}")))?;
        line.push('\n');

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let reply = match tokio::time::timeout(self.response_timeout, self.responses.next_line())
            .await
        {
            Ok(read) => read?.ok_or(TerminalError::Closed)?,
            Err(_) => {
                self.closed = true;
                warn!(
                    timeout_ms = self.response_timeout.as_millis() as u64,
                    "Bridge stopped replying, closing session"
                );
                return Err(TerminalError::Timeout(self.response_timeout));
            }
        };

        let response: BridgeResponse = serde_json::from_str(&reply).map_err(|e| {
            TerminalError::Protocol(format!("invalid bridge response {reply:?}: {e}"))
        })?;

        if !response.ok {
            return Err(TerminalError::Fault(
                response
                    .error
                    .unwrap_or_else(|| "unspecified bridge error".to_string()),
            ));
        }
        Ok(response)
    }
}

#[async_trait]
impl TransactionTerminal for BridgeTerminal {
    async fn open_transaction(&mut self, code: &str) -> TerminalResult<()> {
        debug!(code = code, "Opening transaction");
        self.call(BridgeRequest::OpenTransaction { code }).await?;
        Ok(())
    }

    async fn set_field(&mut self, row: usize, field: FieldKey, value: &str) -> TerminalResult<()> {
        self.call(BridgeRequest::SetField {
            row,
            field: host_field_code(field),
            value,
        })
        .await?;
        Ok(())
    }

    async fn request_validate(&mut self) -> TerminalResult<()> {
        self.call(BridgeRequest::Validate).await?;
        Ok(())
    }

    async fn request_commit(&mut self) -> TerminalResult<()> {
        self.call(BridgeRequest::Commit).await?;
        Ok(())
    }

    async fn read_status_bar(&mut self) -> TerminalResult<StatusBar> {
        let response = self.call(BridgeRequest::ReadStatusBar).await?;
        let severity = response
            .severity
            .as_deref()
            .map(severity_from_host_code)
            .unwrap_or(Severity::Other);
        Ok(StatusBar::new(severity, response.text.unwrap_or_default()))
    }

    async fn dismiss_dialog(&mut self) -> TerminalResult<bool> {
        let response = self.call(BridgeRequest::DismissDialog).await?;
        Ok(response.dismissed)
    }
}
