use ipmiprims_message::{BootDevice, BootParam};
use serde::Serialize;

use crate::cmd::{BootCommand, BootSetArgs, ConnectionArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{hex_bytes, print_record, OutputFormat, Record};

#[derive(Serialize)]
struct BootOutput {
    device: String,
    persistent: bool,
    valid: bool,
    data: String,
}

pub fn run(cmd: BootCommand, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match cmd {
        BootCommand::Get => get(conn, format),
        BootCommand::Set(args) => set(args, conn, format),
    }
}

fn get(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = conn.connect()?;
    let resp = client
        .boot_options(BootParam::BOOT_FLAGS)
        .map_err(|err| client_error("get boot options", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = BootOutput {
        device: resp.boot_device_selector().to_string(),
        persistent: resp.is_persistent(),
        valid: resp.is_valid(),
        data: hex_bytes(&resp.data),
    };
    print(&out, format);
    Ok(SUCCESS)
}

fn set(args: BootSetArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let device = BootDevice::from_name(&args.device)
        .ok_or_else(|| CliError::usage(format!("unknown boot device: {}", args.device)))?;

    let mut client = conn.connect()?;
    client
        .set_boot_device(device, args.persistent)
        .map_err(|err| client_error("set boot device", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = BootOutput {
        device: device.to_string(),
        persistent: args.persistent,
        valid: true,
        data: String::new(),
    };
    print(&out, format);
    Ok(SUCCESS)
}

fn print(out: &BootOutput, format: OutputFormat) {
    let record = Record {
        rows: vec![
            ("Boot Device", out.device.clone()),
            ("Persistent", out.persistent.to_string()),
            ("Valid", out.valid.to_string()),
        ],
        raw: out.device.clone(),
        value: out,
    };
    print_record(&record, format);
}
