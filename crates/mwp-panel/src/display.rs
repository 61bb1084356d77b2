//! Text and colour for table cells and dashboard cards.

use std::fmt;

use mwp_types::dashboard::DeviceData;
use mwp_types::peer::PeerStatus;
use mwp_types::server::ServerStatus;

const NOT_AVAILABLE: &str = "N/A";
const UNLIMITED: &str = "Unlimited";
const BYTES_PER_GB: f64 = 1_000_000_000.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BadgeColor {
    Green,
    Yellow,
    Red,
    Gray,
}

impl BadgeColor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Green => "green",
            Self::Yellow => "yellow",
            Self::Red => "red",
            Self::Gray => "gray",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub text: String,
    pub color: BadgeColor,
}

impl Badge {
    fn new(text: &str, color: BadgeColor) -> Self {
        Self {
            text: text.to_string(),
            color,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.text)
    }
}

pub fn peer_status_color(status: PeerStatus) -> BadgeColor {
    match status {
        PeerStatus::Active => BadgeColor::Green,
        PeerStatus::Inactive => BadgeColor::Gray,
        PeerStatus::Expired => BadgeColor::Yellow,
        PeerStatus::Suspended => BadgeColor::Red,
    }
}

/// One badge per status entry, in the order the backend sent them.
pub fn peer_status_badges(statuses: &[PeerStatus]) -> Vec<Badge> {
    statuses
        .iter()
        .map(|&s| Badge::new(s.as_str(), peer_status_color(s)))
        .collect()
}

pub fn server_status_badge(status: ServerStatus) -> Badge {
    match status {
        ServerStatus::Available => Badge::new("Available", BadgeColor::Green),
        ServerStatus::NotAvailable => Badge::new("Unavailable", BadgeColor::Red),
    }
}

pub fn online_badge(is_online: bool) -> Badge {
    if is_online {
        Badge::new("Online", BadgeColor::Green)
    } else {
        Badge::new("Offline", BadgeColor::Red)
    }
}

pub fn running_badge(is_running: bool) -> Badge {
    if is_running {
        Badge::new("Running", BadgeColor::Green)
    } else {
        Badge::new("Not Running", BadgeColor::Red)
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

pub fn traffic_limit_label(limit: Option<&str>) -> String {
    present(limit).map_or_else(|| UNLIMITED.to_string(), |l| format!("{l} GB"))
}

pub fn expire_label(expire_time: Option<&str>) -> String {
    present(expire_time).unwrap_or(UNLIMITED).to_string()
}

pub fn bandwidth_label(download: Option<&str>, upload: Option<&str>) -> String {
    format!(
        "{}/{}",
        present(download).unwrap_or(UNLIMITED),
        present(upload).unwrap_or(UNLIMITED)
    )
}

/// An empty counter reads as zero, as the router reports idle values.
fn parse_bytes(value: &str) -> Option<f64> {
    let value = value.trim();
    if value.is_empty() {
        return Some(0.0);
    }
    value.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Bytes as decimal gigabytes with two decimals, `None` for non-numbers.
pub fn format_gb(bytes: &str) -> Option<String> {
    parse_bytes(bytes).map(gb)
}

fn gb(bytes: f64) -> String {
    format!("{:.2}", bytes / BYTES_PER_GB)
}

/// `"<used>/<total> GB"` from a total and a free byte count.
pub fn usage_label(total: &str, free: &str) -> String {
    match (parse_bytes(total), parse_bytes(free)) {
        (Some(total), Some(free)) => format!("{}/{} GB", gb(total - free), gb(total)),
        _ => NOT_AVAILABLE.to_string(),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceStat {
    pub label: &'static str,
    pub value: String,
}

pub fn build_device_stats(data: Option<&DeviceData>) -> Vec<DeviceStat> {
    let info = data.map(|d| &d.device_info);
    let uptime = present(info.map(|i| i.uptime.as_str()))
        .unwrap_or(NOT_AVAILABLE)
        .to_string();
    let cpu_load = info.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |i| format!("{}%", present(Some(i.cpu_load.trim())).unwrap_or("0")),
    );
    let memory = info.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |i| usage_label(&i.total_memory, &i.free_memory),
    );
    let disk = info.map_or_else(
        || NOT_AVAILABLE.to_string(),
        |i| usage_label(&i.total_disk, &i.free_disk),
    );

    vec![
        DeviceStat { label: "Uptime", value: uptime },
        DeviceStat { label: "CPU Load", value: cpu_load },
        DeviceStat { label: "Memory Usage", value: memory },
        DeviceStat { label: "Disk Usage", value: disk },
    ]
}

/// Avatar initials for peers named like `laptop-alice`: the first two
/// characters of the second segment, upper-cased, else `U`.
pub fn initials(name: &str) -> String {
    name.split('-')
        .nth(1)
        .map(|seg| seg.chars().take(2).collect::<String>().to_uppercase())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "U".to_string())
}
