use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use dmxlink_transport::{SerialPortInfo, SerialPortType};
use dmxlink_widget::{WidgetIdentity, WidgetParameters};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
struct InfoOutput<'a> {
    port: &'a str,
    firmware_version: u16,
    serial_number: String,
    break_time: u8,
    mark_after_break_time: u8,
    output_rate: u8,
    user_config_len: usize,
}

pub fn print_info(
    port: &str,
    params: &WidgetParameters,
    identity: &WidgetIdentity,
    format: OutputFormat,
) {
    let serial = format!("{:08X}", identity.serial_number);
    match format {
        OutputFormat::Json => {
            let out = InfoOutput {
                port,
                firmware_version: identity.firmware_version,
                serial_number: serial,
                break_time: params.break_time,
                mark_after_break_time: params.mark_after_break_time,
                output_rate: params.output_rate,
                user_config_len: params.user_config.len(),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PARAMETER", "VALUE"])
                .add_row(vec!["port".to_string(), port.to_string()])
                .add_row(vec![
                    "firmware".to_string(),
                    firmware_display(identity.firmware_version),
                ])
                .add_row(vec!["serial".to_string(), serial])
                .add_row(vec![
                    "break time".to_string(),
                    timing_display(params.break_time),
                ])
                .add_row(vec![
                    "mark-after-break".to_string(),
                    timing_display(params.mark_after_break_time),
                ])
                .add_row(vec![
                    "output rate".to_string(),
                    format!("{} packets/s", params.output_rate),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "port={} firmware={} serial={} break={} mab={} rate={}",
                port,
                firmware_display(identity.firmware_version),
                serial,
                params.break_time,
                params.mark_after_break_time,
                params.output_rate
            );
        }
    }
}

#[derive(Serialize)]
struct PortOutput {
    name: String,
    kind: &'static str,
    detail: String,
}

pub fn print_ports(ports: &[SerialPortInfo], format: OutputFormat) {
    let rows: Vec<PortOutput> = ports
        .iter()
        .map(|info| {
            let (kind, detail) = describe_port_type(&info.port_type);
            PortOutput {
                name: info.port_name.clone(),
                kind,
                detail,
            }
        })
        .collect();

    match format {
        OutputFormat::Json => {
            println!(
                "{}",
                serde_json::to_string(&rows).unwrap_or_else(|_| "[]".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["PORT", "TYPE", "DETAIL"]);
            for row in &rows {
                table.add_row(vec![row.name.clone(), row.kind.to_string(), row.detail.clone()]);
            }
            println!("{table}");
        }
        OutputFormat::Pretty => {
            for row in &rows {
                println!("{} ({}) {}", row.name, row.kind, row.detail);
            }
        }
    }
}

fn describe_port_type(port_type: &SerialPortType) -> (&'static str, String) {
    match port_type {
        SerialPortType::UsbPort(usb) => {
            let product = usb.product.as_deref().unwrap_or("unknown device");
            ("usb", format!("{:04x}:{:04x} {}", usb.vid, usb.pid, product))
        }
        SerialPortType::PciPort => ("pci", String::new()),
        SerialPortType::BluetoothPort => ("bluetooth", String::new()),
        SerialPortType::Unknown => ("unknown", String::new()),
    }
}

fn firmware_display(version: u16) -> String {
    format!("{}.{}", version >> 8, version & 0xFF)
}

fn timing_display(ticks: u8) -> String {
    // Device ticks are 10.67 µs each.
    format!("{} ({:.1} µs)", ticks, f64::from(ticks) * 10.67)
}
