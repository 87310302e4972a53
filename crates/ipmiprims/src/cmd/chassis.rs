use ipmiprims_message::{ChassisControl, PowerRestorePolicy};
use serde::Serialize;

use crate::cmd::{ChassisCommand, ConnectionArgs, PowerAction};
use crate::exit::{client_error, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat, Record};

#[derive(Serialize)]
struct ChassisStatusOutput {
    power_on: bool,
    power_overload: bool,
    power_fault: bool,
    restore_policy: &'static str,
    last_power_event: u8,
    intrusion: bool,
}

#[derive(Serialize)]
struct PowerOutput {
    action: &'static str,
    accepted: bool,
}

pub fn run(cmd: ChassisCommand, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match cmd {
        ChassisCommand::Status => status(conn, format),
        ChassisCommand::Power(args) => power(args.action, conn, format),
    }
}

fn status(conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = conn.connect()?;
    let resp = client
        .chassis_status()
        .map_err(|err| client_error("chassis status", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = ChassisStatusOutput {
        power_on: resp.is_power_on(),
        power_overload: resp.power_state & ipmiprims_message::chassis::POWER_OVERLOAD != 0,
        power_fault: resp.power_state
            & (ipmiprims_message::chassis::MAIN_POWER_FAULT
                | ipmiprims_message::chassis::POWER_CONTROL_FAULT)
            != 0,
        restore_policy: match resp.power_restore_policy() {
            PowerRestorePolicy::AlwaysOff => "always-off",
            PowerRestorePolicy::Previous => "previous",
            PowerRestorePolicy::AlwaysOn => "always-on",
            PowerRestorePolicy::Unknown => "unknown",
        },
        last_power_event: resp.last_power_event,
        intrusion: resp.chassis_intrusion(),
    };
    let power = if out.power_on { "on" } else { "off" };
    let record = Record {
        rows: vec![
            ("System Power", power.to_string()),
            ("Power Overload", out.power_overload.to_string()),
            ("Power Fault", out.power_fault.to_string()),
            ("Restore Policy", out.restore_policy.to_string()),
            ("Last Power Event", format!("0x{:02x}", out.last_power_event)),
            ("Chassis Intrusion", out.intrusion.to_string()),
        ],
        raw: power.to_string(),
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}

fn power(action: PowerAction, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let (control, name) = match action {
        PowerAction::On => (ChassisControl::PowerUp, "on"),
        PowerAction::Off => (ChassisControl::PowerDown, "off"),
        PowerAction::Cycle => (ChassisControl::PowerCycle, "cycle"),
        PowerAction::Reset => (ChassisControl::HardReset, "reset"),
        PowerAction::Diag => (ChassisControl::PulseDiagnosticInterrupt, "diag"),
        PowerAction::Soft => (ChassisControl::SoftShutdown, "soft"),
    };

    let mut client = conn.connect()?;
    client
        .chassis_control(control)
        .map_err(|err| client_error("chassis control", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = PowerOutput {
        action: name,
        accepted: true,
    };
    let record = Record {
        rows: vec![("Power Control", name.to_string())],
        raw: name.to_string(),
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}
