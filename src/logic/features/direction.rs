//! Direction Classifier
//!
//! Chia flow thành forward/backward theo initiator.
//!
//! The initiator is the `(src_ip, src_port)` pair of the first submitted
//! packet, regardless of timestamp order. Packets that cannot be parsed are
//! skipped with a warning; the flow is reconstructed best-effort.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;

use super::timing::parse_timestamp;

/// A packet skipped during classification
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DroppedPacket {
    pub index: usize,
    pub reason: String,
}

/// Time points split by direction, in submitted order (unsorted)
#[derive(Debug, Clone, Default)]
pub struct FlowTimestamps {
    pub forward: Vec<DateTime<Utc>>,
    pub backward: Vec<DateTime<Utc>>,
    pub all: Vec<DateTime<Utc>>,
    pub dropped: Vec<DroppedPacket>,
}

/// Source endpoint of a packet, compared as raw JSON.
#[derive(Debug, Clone, Copy)]
struct Endpoint<'a> {
    ip: &'a Value,
    port: &'a Value,
}

impl<'a> Endpoint<'a> {
    fn of(packet: &'a Value) -> Option<Self> {
        Some(Self {
            ip: packet.get("src_ip")?,
            port: packet.get("src_port")?,
        })
    }

    fn matches(&self, other: &Endpoint<'_>) -> bool {
        same_value(self.ip, other.ip) && same_value(self.port, other.port)
    }
}

/// JSON equality, except numbers compare by value (`80 == 80.0`).
fn same_value(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => match (x.as_f64(), y.as_f64()) {
            (Some(x), Some(y)) => x == y,
            _ => x == y,
        },
        _ => a == b,
    }
}

/// Partition raw packets into forward, backward and all timestamp lists.
pub fn classify(packets: &[Value]) -> FlowTimestamps {
    let mut flow = FlowTimestamps::default();

    // Normally packet 0; only differs when the caller skipped validation.
    let initiator = packets.iter().find_map(Endpoint::of);

    for (index, packet) in packets.iter().enumerate() {
        match read_packet(packet) {
            Ok((endpoint, timestamp)) => {
                flow.all.push(timestamp);

                let is_forward = initiator
                    .map(|init| init.matches(&endpoint))
                    .unwrap_or(false);

                if is_forward {
                    flow.forward.push(timestamp);
                } else {
                    flow.backward.push(timestamp);
                }
            }
            Err(reason) => {
                tracing::warn!(index, %reason, "Skipping malformed packet");
                flow.dropped.push(DroppedPacket { index, reason });
            }
        }
    }

    flow
}

fn read_packet(packet: &Value) -> Result<(Endpoint<'_>, DateTime<Utc>), String> {
    let raw = packet
        .get("timestamp")
        .ok_or_else(|| "missing field: timestamp".to_string())?;
    let raw = raw
        .as_str()
        .ok_or_else(|| format!("timestamp is not a string: {}", raw))?;
    let timestamp = parse_timestamp(raw)
        .map_err(|e| format!("invalid timestamp '{}': {}", raw, e))?;

    let endpoint = Endpoint::of(packet)
        .ok_or_else(|| "missing field: src_ip or src_port".to_string())?;

    Ok((endpoint, timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn packet(ts: &str, ip: &str, port: u16) -> Value {
        json!({
            "timestamp": ts,
            "src_ip": ip,
            "dst_ip": "10.0.0.1",
            "src_port": port,
            "dst_port": 443,
        })
    }

    #[test]
    fn test_empty_flow() {
        let flow = classify(&[]);
        assert!(flow.forward.is_empty());
        assert!(flow.backward.is_empty());
        assert!(flow.all.is_empty());
        assert!(flow.dropped.is_empty());
    }

    #[test]
    fn test_initiator_is_first_submitted() {
        // First packet is the latest by time but still defines forward.
        let packets = vec![
            packet("2024-03-01T12:00:05", "192.168.1.2", 50000),
            packet("2024-03-01T12:00:01", "10.0.0.1", 443),
            packet("2024-03-01T12:00:02", "192.168.1.2", 50000),
            packet("2024-03-01T12:00:03", "192.168.1.2", 50001),
        ];

        let flow = classify(&packets);
        assert_eq!(flow.forward.len(), 2);
        assert_eq!(flow.backward.len(), 2);
        assert_eq!(flow.all.len(), 4);
        assert_eq!(flow.forward[0], parse_timestamp("2024-03-01T12:00:05").unwrap());
    }

    #[test]
    fn test_keeps_submitted_order() {
        let packets = vec![
            packet("2024-03-01T12:00:03", "a", 1),
            packet("2024-03-01T12:00:01", "a", 1),
        ];
        let flow = classify(&packets);
        assert!(flow.all[0] > flow.all[1]);
    }

    #[test]
    fn test_numeric_port_compare() {
        let packets = vec![
            json!({"timestamp": "2024-03-01T12:00:00", "src_ip": "a", "src_port": 80}),
            json!({"timestamp": "2024-03-01T12:00:01", "src_ip": "a", "src_port": 80.0}),
            json!({"timestamp": "2024-03-01T12:00:02", "src_ip": "a", "src_port": "80"}),
        ];
        let flow = classify(&packets);
        assert_eq!(flow.forward.len(), 2);
        assert_eq!(flow.backward.len(), 1);
    }

    #[test]
    fn test_malformed_packets_dropped() {
        let packets = vec![
            packet("2024-03-01T12:00:00", "a", 1),
            packet("not a timestamp", "a", 1),
            json!({"src_ip": "a", "src_port": 1}),
            json!({"timestamp": 12345, "src_ip": "b", "src_port": 2}),
            json!({"timestamp": "2024-03-01T12:00:01", "src_ip": "b"}),
            packet("2024-03-01T12:00:02", "b", 2),
        ];

        let flow = classify(&packets);
        assert_eq!(flow.all.len(), 2);
        assert_eq!(flow.forward.len(), 1);
        assert_eq!(flow.backward.len(), 1);

        let indices: Vec<usize> = flow.dropped.iter().map(|d| d.index).collect();
        assert_eq!(indices, vec![1, 2, 3, 4]);
    }
}
