use serde::Serialize;

use crate::cmd::ConnectionArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat, Record};

#[derive(Serialize)]
struct OptionsOutput {
    tool: Option<String>,
    options: Vec<String>,
}

pub fn run(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let conn = conn.resolve()?;
    let options = ipmiprims_transport::options(&conn);
    let joined = options.join(" ");

    let out = OptionsOutput {
        tool: conn.tool_path().map(|path| path.display().to_string()),
        options,
    };
    let record = Record {
        rows: vec![
            (
                "Tool",
                out.tool
                    .clone()
                    .unwrap_or_else(|| ipmiprims_transport::DEFAULT_TOOL.to_string()),
            ),
            ("Options", joined.clone()),
        ],
        raw: joined,
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}
