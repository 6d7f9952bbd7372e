//! Line-oriented command shell over a [`TinyGController`]
//!
//! Realtime commands are recognised by their literal bytes (`!`, `~`, `%`,
//! `!%`); a few words control the session; every other line is G-code.

use std::fmt::Write as _;
use tinyg_control_communication::{list_ports, TinyGController};

/// One parsed shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Empty,
    FeedHold,
    FeedResume,
    Flush,
    HoldFlush,
    Reset,
    State,
    Online,
    Refresh,
    Ports,
    Help,
    Quit,
    /// JSON command for the control lane
    Command(String),
    Gcode(String),
}

impl ShellCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        match line {
            "" => Self::Empty,
            "!" => Self::FeedHold,
            "~" => Self::FeedResume,
            "%" => Self::Flush,
            "!%" => Self::HoldFlush,
            _ => match line.to_ascii_lowercase().as_str() {
                "reset" => Self::Reset,
                "state" => Self::State,
                "online" => Self::Online,
                "refresh" => Self::Refresh,
                "ports" => Self::Ports,
                "help" | "?" => Self::Help,
                "quit" | "exit" => Self::Quit,
                _ if line.starts_with('{') => Self::Command(line.to_string()),
                _ => Self::Gcode(line.to_string()),
            },
        }
    }
}

pub const HELP: &str = "\
!        feed hold
~        resume
%        flush queue and clear alarms
!%       feed hold and flush
reset    hardware reset
state    print machine state as JSON
online   link status
refresh  request every reported value
ports    list serial ports
quit     close the link and exit
{...}    send a JSON command
anything else is sent as G-code";

/// Outcome of one shell line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Continue(Option<String>),
    Quit,
}

/// Run one parsed command against the controller
pub async fn execute(
    controller: &TinyGController,
    command: ShellCommand,
) -> tinyg_control_core::Result<Reply> {
    let output = match command {
        ShellCommand::Empty => None,
        ShellCommand::Quit => return Ok(Reply::Quit),
        ShellCommand::Help => Some(HELP.to_string()),
        ShellCommand::FeedHold => {
            controller.feed_hold().await?;
            None
        }
        ShellCommand::FeedResume => {
            controller.feed_resume().await?;
            None
        }
        ShellCommand::Flush => {
            controller.flush().await?;
            None
        }
        ShellCommand::HoldFlush => {
            controller.feed_hold_flush().await?;
            None
        }
        ShellCommand::Reset => {
            controller.reset().await?;
            None
        }
        ShellCommand::State => Some(controller.state_json()?),
        ShellCommand::Online => Some(status_line(controller)),
        ShellCommand::Refresh => {
            let queued = controller.refresh_state()?;
            Some(format!("{} request(s) queued", queued))
        }
        ShellCommand::Ports => {
            let ports = list_ports()?;
            if ports.is_empty() {
                Some("no serial ports found".to_string())
            } else {
                Some(
                    ports
                        .iter()
                        .map(|port| port.to_string())
                        .collect::<Vec<_>>()
                        .join("\n"),
                )
            }
        }
        ShellCommand::Command(command) => {
            controller.submit_command(&command)?;
            None
        }
        ShellCommand::Gcode(line) => {
            controller.submit([line])?;
            None
        }
    };
    Ok(Reply::Continue(output))
}

fn status_line(controller: &TinyGController) -> String {
    let mut line = format!(
        "{} ({})",
        if controller.is_online() { "online" } else { "offline" },
        controller.link_phase()
    );
    if let (Ok(credit), Ok(queued)) = (controller.credit(), controller.queued()) {
        let _ = write!(line, ", credit {}, {} queued", credit, queued);
    }
    if let Some(spindle) = controller.spindle_status() {
        let _ = write!(
            line,
            ", spindle {:.0} rpm {:.1}/{:.1} Hz",
            spindle.output_rpm, spindle.output_frequency, spindle.frequency_set
        );
    }
    line
}
