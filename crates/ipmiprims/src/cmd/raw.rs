use ipmiprims_message::NetworkFunction;
use serde::Serialize;

use crate::cmd::{ConnectionArgs, RawArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{hex_bytes, print_record, OutputFormat, Record};

#[derive(Serialize)]
struct RawOutput {
    netfn: u8,
    cmd: u8,
    completion_code: u8,
    data: String,
}

pub fn run(args: RawArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let netfn = NetworkFunction::try_from(args.netfn)
        .map_err(|err| CliError::usage(err.to_string()))?;

    let mut client = conn.connect()?;
    let resp = client
        .raw(netfn, args.cmd, args.data)
        .map_err(|err| client_error("raw command", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let data = hex_bytes(&resp.data);
    let out = RawOutput {
        netfn: netfn.as_u8(),
        cmd: args.cmd,
        completion_code: resp.completion_code.0,
        data: data.clone(),
    };
    let record = Record {
        rows: vec![
            ("Network Function", netfn.to_string()),
            ("Command", format!("0x{:02x}", args.cmd)),
            ("Data", data.clone()),
        ],
        raw: data,
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}
