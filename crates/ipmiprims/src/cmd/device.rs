use serde::Serialize;

use crate::cmd::ConnectionArgs;
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat, Record};

#[derive(Serialize)]
struct DeviceIdOutput {
    device_id: u8,
    device_revision: u8,
    firmware_revision: String,
    ipmi_version: String,
    manufacturer_id: u32,
    product_id: u16,
    update_in_progress: bool,
}

pub fn run(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = conn.connect()?;
    let resp = client
        .device_id()
        .map_err(|err| client_error("device id", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let (major, minor) = resp.ipmi_version_parts();
    let out = DeviceIdOutput {
        device_id: resp.device_id,
        device_revision: resp.device_revision & 0x0f,
        firmware_revision: format!(
            "{}.{:02x}",
            resp.firmware_revision1 & 0x7f,
            resp.firmware_revision2
        ),
        ipmi_version: format!("{major}.{minor}"),
        manufacturer_id: resp.manufacturer_id,
        product_id: resp.product_id,
        update_in_progress: resp.update_in_progress(),
    };
    let record = Record {
        rows: vec![
            ("Device ID", out.device_id.to_string()),
            ("Device Revision", out.device_revision.to_string()),
            ("Firmware Revision", out.firmware_revision.clone()),
            ("IPMI Version", out.ipmi_version.clone()),
            ("Manufacturer ID", out.manufacturer_id.to_string()),
            ("Product ID", out.product_id.to_string()),
            ("Update In Progress", out.update_in_progress.to_string()),
        ],
        raw: format!("{} {}", out.device_id, out.firmware_revision),
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}
