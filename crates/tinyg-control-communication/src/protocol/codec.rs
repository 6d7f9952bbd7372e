//! Frame codec
//!
//! Inbound frames are single JSON lines of the form
//! `{"r":{...},"f":[revision,status,free_slots]}`. The data section `r`
//! decodes straight into a partial [`MachineState`]; absent keys stay `None`
//! and unknown keys are ignored. Outbound lines are the command text plus a
//! single newline.

use serde::Deserialize;
use tinyg_control_core::data::merge_nested;
use tinyg_control_core::{MachineState, ProtocolError, StatusCode, StatusReport};

/// Response footer (`f`)
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(transparent)]
pub struct Footer(pub Vec<i64>);

impl Footer {
    /// Protocol revision (element 0)
    pub fn revision(&self) -> Option<i64> {
        self.0.first().copied()
    }

    /// Status code of the acknowledged line (element 1)
    pub fn status_code(&self) -> Option<StatusCode> {
        self.0
            .get(1)
            .and_then(|code| u16::try_from(*code).ok())
            .map(StatusCode)
    }

    /// Free slots in the device receive buffer (element 2)
    pub fn free_slots(&self) -> Option<i64> {
        self.0.get(2).copied()
    }

    /// A three element footer acknowledges one consumed line
    pub fn is_credit_report(&self) -> bool {
        self.0.len() == 3
    }
}

/// One decoded inbound frame
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Response {
    /// Data section
    #[serde(rename = "r", default)]
    pub data: MachineState,
    /// Footer
    #[serde(rename = "f", default)]
    pub footer: Footer,
    /// Unsolicited status report sent without the `r` wrapper
    #[serde(rename = "sr", default)]
    pub status_report: Option<StatusReport>,
    /// Exception report
    #[serde(rename = "er", default)]
    pub exception: Option<serde_json::Value>,
}

impl Response {
    /// Everything this frame says about the machine, as one partial update
    pub fn into_update(self) -> MachineState {
        let mut update = self.data;
        merge_nested(&mut update.status_report, &self.status_report);
        update
    }
}

/// Decode one line (without terminator) into a [`Response`]
pub fn decode(bytes: &[u8]) -> Result<Response, ProtocolError> {
    let text = String::from_utf8_lossy(bytes);
    let line = text.trim();
    if line.is_empty() {
        return Err(ProtocolError::EmptyFrame);
    }
    serde_json::from_str(line).map_err(|e| ProtocolError::MalformedFrame {
        line: line.to_string(),
        reason: e.to_string(),
    })
}

/// Encode a command for the wire
pub fn encode(command: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(command.len() + 1);
    bytes.extend_from_slice(command.as_bytes());
    bytes.push(b'\n');
    bytes
}

/// Strip comments and surrounding whitespace from a G-code line
///
/// Everything from the first `(` or `;` is dropped.
pub fn normalize(line: &str) -> String {
    let end = line.find(['(', ';']).unwrap_or(line.len());
    line[..end]
        .trim_end_matches(['\r', '\n'])
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tinyg_control_core::{AxisTable, MachineStatus};

    #[test]
    fn test_decode_machine_position() {
        let response = decode(br#"{"r":{"mpo":{"x":3.0,"y":0,"z":0}},"f":[1,0,4]}"#).unwrap();
        assert_eq!(
            response.data.machine_position,
            Some(AxisTable::xyz(3.0, 0.0, 0.0))
        );
        assert_eq!(response.footer.revision(), Some(1));
        assert_eq!(response.footer.status_code(), Some(StatusCode::OK));
        assert_eq!(response.footer.free_slots(), Some(4));
        assert!(response.footer.is_credit_report());
    }

    #[test]
    fn test_decode_missing_sections() {
        let response = decode(b"{}").unwrap();
        assert!(response.data.is_empty());
        assert!(!response.footer.is_credit_report());

        let response = decode(br#"{"f":[1,0,6,1234]}"#).unwrap();
        assert!(!response.footer.is_credit_report());
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert_eq!(decode(b"   "), Err(ProtocolError::EmptyFrame));
        assert!(matches!(
            decode(b"tinyg [mm] ok>"),
            Err(ProtocolError::MalformedFrame { .. })
        ));
        assert!(matches!(
            decode(br#"{"r":{"mpo":"#),
            Err(ProtocolError::MalformedFrame { .. })
        ));
    }

    #[test]
    fn test_top_level_status_report_is_merged() {
        let response =
            decode(br#"{"r":{"sr":{"line":7}},"sr":{"stat":5,"vel":120.5}}"#).unwrap();
        let update = response.into_update();
        let sr = update.status_report.unwrap();
        assert_eq!(sr.line_number, Some(7));
        assert_eq!(sr.machine_status, Some(MachineStatus::Run));
        assert_eq!(sr.velocity, Some(120.5));
    }

    #[test]
    fn test_out_of_range_mode_keeps_the_frame() {
        let response = decode(br#"{"r":{"sr":{"stat":300,"line":9}},"f":[1,0,4]}"#).unwrap();
        assert!(response.footer.is_credit_report());
        let sr = response.into_update().status_report.unwrap();
        assert_eq!(sr.machine_status, Some(MachineStatus::Unknown(300)));
        assert_eq!(sr.line_number, Some(9));
    }

    #[test]
    fn test_encode_appends_single_newline() {
        assert_eq!(encode("{sr:n}"), b"{sr:n}\n".to_vec());
        assert_eq!(encode(""), b"\n".to_vec());
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("G1 X1 (comment) ; trailing\r\n"), "G1 X1");
        assert_eq!(normalize("G0 Z5 ; lift"), "G0 Z5");
        assert_eq!(normalize("(only a comment)"), "");
        assert_eq!(normalize("  M3 S1000\r\n"), "M3 S1000");
        assert_eq!(normalize("{sr:n}"), "{sr:n}");
    }
}
