use serde::Serialize;

use crate::cmd::{ConnectionArgs, UserCommand, UserNameArgs, UserPasswordArgs, UserSummaryArgs};
use crate::exit::{client_error, CliError, CliResult, SUCCESS};
use crate::output::{print_record, OutputFormat, Record};

#[derive(Serialize)]
struct UserNameOutput {
    user_id: u8,
    username: String,
}

#[derive(Serialize)]
struct UserUpdateOutput {
    user_id: u8,
    updated: &'static str,
}

#[derive(Serialize)]
struct UserSummaryOutput {
    channel: u8,
    user_id: u8,
    max_users: u8,
    enabled_users: u8,
    fixed_name_users: u8,
    privilege_limit: u8,
}

pub fn run(cmd: UserCommand, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    match cmd {
        UserCommand::Name(args) => name(args, conn, format),
        UserCommand::Password(args) => password(args, conn, format),
        UserCommand::Enable(args) => {
            let mut client = conn.connect()?;
            client
                .enable_user(args.id)
                .map_err(|err| client_error("enable user", err))?;
            client
                .close()
                .map_err(|err| client_error("close failed", err))?;
            print_update(args.id, "enabled", format);
            Ok(SUCCESS)
        }
        UserCommand::Summary(args) => summary(args, conn, format),
    }
}

fn name(args: UserNameArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = conn.connect()?;
    if let Some(new_name) = &args.set {
        client
            .set_user_name(args.id, new_name)
            .map_err(|err| client_error("set user name", err))?;
    }
    let username = client
        .user_name(args.id)
        .map_err(|err| client_error("get user name", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = UserNameOutput {
        user_id: args.id,
        username,
    };
    let record = Record {
        rows: vec![
            ("User ID", out.user_id.to_string()),
            ("User Name", out.username.clone()),
        ],
        raw: out.username.clone(),
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}

fn password(args: UserPasswordArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let secret = std::env::var(&args.password_env).map_err(|_| {
        CliError::usage(format!(
            "password variable {} is not set",
            args.password_env
        ))
    })?;

    let mut client = conn.connect()?;
    client
        .set_user_password(args.id, secret.as_bytes())
        .map_err(|err| client_error("set user password", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    print_update(args.id, "password", format);
    Ok(SUCCESS)
}

fn summary(args: UserSummaryArgs, conn: &ConnectionArgs, format: OutputFormat) -> CliResult<i32> {
    let mut client = conn.connect()?;
    let resp = client
        .user_summary(args.channel, args.id)
        .map_err(|err| client_error("get user access", err))?;
    client
        .close()
        .map_err(|err| client_error("close failed", err))?;

    let out = UserSummaryOutput {
        channel: args.channel,
        user_id: args.id,
        max_users: resp.max_user_count(),
        enabled_users: resp.enabled_user_count(),
        fixed_name_users: resp.fixed_name_users & 0x3f,
        privilege_limit: resp.privilege_limit(),
    };
    let record = Record {
        rows: vec![
            ("Maximum IDs", out.max_users.to_string()),
            ("Enabled User Count", out.enabled_users.to_string()),
            ("Fixed Name Count", out.fixed_name_users.to_string()),
            ("Privilege Limit", out.privilege_limit.to_string()),
        ],
        raw: format!("{} {}", out.enabled_users, out.max_users),
        value: &out,
    };
    print_record(&record, format);
    Ok(SUCCESS)
}

fn print_update(user_id: u8, updated: &'static str, format: OutputFormat) {
    let out = UserUpdateOutput { user_id, updated };
    let record = Record {
        rows: vec![
            ("User ID", user_id.to_string()),
            ("Updated", updated.to_string()),
        ],
        raw: user_id.to_string(),
        value: &out,
    };
    print_record(&record, format);
}
