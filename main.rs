/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Text front end for the bundled people workbench.
//!
//! ```text
//! gateshell --actor alice menu grant:NewPersonPerm menu invoke:file.new_person editors
//! ```

use std::path::PathBuf;
use std::process::ExitCode;
use std::str::FromStr;
use std::sync::Arc;

use bpaf::Bpaf;

use gateshell::mods::native::people::{self, DebugView};
use gateshell::mods::native::accounts;
use gateshell::registries::atomic::capability::Capability;
use gateshell::{ActorId, IdentitySource, InMemoryIdentitySource, Session, Shell, ShellConfig};

#[derive(Debug, Clone, Bpaf)]
#[bpaf(options, version)]
/// Drive a capability-gated shell session from the command line.
struct Cli {
    /// Shell configuration file (TOML)
    #[bpaf(long, argument("PATH"))]
    config: Option<PathBuf>,

    /// Actor logged in before the first step, and the target of `login`
    #[bpaf(long, argument("NAME"))]
    actor: Option<String>,

    /// Log filter, e.g. `info,registry.handler=debug`
    #[bpaf(long("log"), argument("FILTER"))]
    log_filter: Option<String>,

    /// menu | views | editors | logout | login:ACTOR | grant:CAP | revoke:CAP | invoke:ID | layout:NAME
    #[bpaf(positional("STEP"))]
    steps: Vec<Step>,
}

#[derive(Debug, Clone)]
enum Step {
    Menu,
    Views,
    Editors,
    Logout,
    Login(String),
    Grant(String),
    Revoke(String),
    Invoke(String),
    Layout(String),
}

impl FromStr for Step {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = match s.split_once(':') {
            None => match s {
                "menu" => Self::Menu,
                "views" => Self::Views,
                "editors" => Self::Editors,
                "logout" => Self::Logout,
                _ => return Err(format!("unknown step '{s}'")),
            },
            Some((_, "")) => return Err(format!("step '{s}' needs an argument")),
            Some(("login", actor)) => Self::Login(actor.to_string()),
            Some(("grant", capability)) => Self::Grant(capability.to_string()),
            Some(("revoke", capability)) => Self::Revoke(capability.to_string()),
            Some(("invoke", command)) => Self::Invoke(command.to_string()),
            Some(("layout", layout)) => Self::Layout(layout.to_string()),
            Some((verb, _)) => return Err(format!("unknown step '{verb}'")),
        };
        Ok(step)
    }
}

fn main() -> ExitCode {
    let cli = cli().run();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            log::error!("{error}");
            eprintln!("gateshell: {error}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> gateshell::Result<()> {
    let config = match &cli.config {
        Some(path) => ShellConfig::load(path)?,
        None => ShellConfig::default(),
    };
    gateshell::init_tracing(cli.log_filter.as_deref().or(config.logging.filter.as_deref()));
    log::info!("gateshell {}", gateshell::VERSION);

    let identity = Arc::new(InMemoryIdentitySource::new());
    let login_as = cli.actor.clone().map(ActorId::new).unwrap_or_else(|| ActorId::new("admin"));
    if cli.actor.is_some() {
        identity.login(login_as.clone());
    }

    let builder = people::install(Shell::builder(identity.clone())).default_layout(people::LAYOUT_FOO);
    let shell = accounts::install(builder, identity.clone(), login_as)
        .menu_order(["File", "View", "User"])
        .with_config(&config)
        .build()?;
    let mut session = shell.open_session()?;

    for step in cli.steps {
        if session.is_closed() {
            println!("(session has exited; ignoring remaining steps)");
            break;
        }
        apply(&mut session, &identity, &step)?;
        for event in session.pump_identity_events() {
            log::debug!("identity event: {event:?}");
        }
        if let Some(debug) = session
            .views_mut()
            .get_mut(people::VIEW_DEBUG)
            .and_then(|instance| instance.downcast_mut::<DebugView>())
        {
            debug.push_line(format!("{step:?}"));
        }
    }
    Ok(())
}

fn apply(session: &mut Session, identity: &InMemoryIdentitySource, step: &Step) -> gateshell::Result<()> {
    match step {
        Step::Menu => print_menu(session),
        Step::Views => print_views(session),
        Step::Editors => print_editors(session),
        Step::Logout => identity.logout(),
        Step::Login(actor) => identity.login(actor.as_str()),
        Step::Grant(capability) => identity.grant(&identity.current_actor(), capability.as_str()),
        Step::Revoke(capability) => {
            identity.revoke(&identity.current_actor(), &Capability::new(capability.as_str()))
        }
        Step::Invoke(command) => match session.invoke(command) {
            Ok(execution) => println!("ran {} ({} intent(s))", execution.command_id, execution.intents.len()),
            Err(error) if error.is_configuration() => return Err(error),
            Err(error) => println!("{command}: {error}"),
        },
        Step::Layout(name) => match session.activate_layout(name) {
            Ok(()) => print_views(session),
            Err(error) if error.is_configuration() => return Err(error),
            Err(error) => println!("{name}: {error}"),
        },
    }
    Ok(())
}

fn print_menu(session: &Session) {
    println!("menu for '{}':", session.actor().id());
    let mut current_menu = None;
    for row in session.menu_snapshot() {
        if current_menu.as_deref() != Some(row.menu.as_str()) {
            println!("{}", row.menu);
            current_menu = Some(row.menu.clone());
        }
        let indent = "  ".repeat(row.depth + 1);
        let mark = if row.enabled { ' ' } else { '-' };
        match &row.command_id {
            Some(id) => println!("{indent}{mark} {} <{id}>", row.label),
            None => println!("{indent}  {} >", row.label),
        }
    }
    let toolbar = session.toolbar();
    let tools: Vec<String> = toolbar
        .items()
        .iter()
        .map(|proxy| {
            let name = if toolbar.show_tool_names() { proxy.label() } else { proxy.id() };
            let mark = if proxy.is_enabled(session.actor()) { "" } else { "-" };
            format!("[{mark}{name}]")
        })
        .collect();
    println!("toolbar: {}", tools.join(" "));
}

fn print_views(session: &Session) {
    println!(
        "views (layout {}):",
        session.active_layout().unwrap_or("<none>")
    );
    for instance in session.views().instances() {
        match instance.anchor() {
            Some(anchor) => println!("  {} @ {anchor}", instance.view_id()),
            None => println!("  {} (unplaced)", instance.view_id()),
        }
    }
}

fn print_editors(session: &Session) {
    println!("editors:");
    for editor in session.editors() {
        println!(
            "  {} via {} ({})",
            editor.handler.title(),
            editor.handler_id,
            editor.matched_by.as_str()
        );
    }
}
