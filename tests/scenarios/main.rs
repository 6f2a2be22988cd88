use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use gateshell::mods::native::{accounts, people};
use gateshell::registries::atomic::capability::{Capability, CapabilitySet};
use gateshell::registries::atomic::command::{Command, CommandProxy};
use gateshell::registries::atomic::handler::{
    ContentObject, Handler, HandlerChain, HandlerDescriptor, HandlerKind, MatchTier,
};
use gateshell::registries::atomic::handler_store::{InMemoryHandlerStore, RememberedHandlerStore};
use gateshell::registries::atomic::menu::{GroupTarget, StaticContributor};
use gateshell::registries::domain::layout::Placement;
use gateshell::registries::domain::layout::anchor::Anchor;
use gateshell::shell::view_menu::layout_command_id;
use gateshell::{
    ActorId, IdentityEvent, IdentitySource, InMemoryIdentitySource, Shell, ShellBuilder,
    ShellConfig, ShellError, VERSION,
};

fn workbench(identity: &Arc<InMemoryIdentitySource>) -> ShellBuilder {
    let builder = people::install(Shell::builder(identity.clone())).default_layout(people::LAYOUT_FOO);
    accounts::install(builder, identity.clone(), ActorId::new("admin"))
}

#[derive(Debug)]
struct Inspector(ContentObject, &'static str);

impl Handler for Inspector {
    fn handler_id(&self) -> &str {
        self.1
    }

    fn object(&self) -> &ContentObject {
        &self.0
    }
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn new_person_enables_after_grant_without_rebuilding_menu_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();

    let before = session.menu().find(people::CMD_NEW_PERSON).unwrap() as *const CommandProxy;
    assert!(!session.is_enabled(people::CMD_NEW_PERSON).unwrap());
    assert!(session.is_enabled(accounts::CMD_LOGIN).unwrap());
    assert!(session.is_enabled(accounts::CMD_LOGOUT).unwrap());

    identity.grant(&ActorId::anonymous(), people::NEW_PERSON_PERM);

    let after = session.menu().find(people::CMD_NEW_PERSON).unwrap() as *const CommandProxy;
    assert_eq!(before, after);
    assert!(session.is_enabled(people::CMD_NEW_PERSON).unwrap());

    session.invoke(people::CMD_NEW_PERSON).unwrap();
    assert_eq!(session.editors().len(), 1);
    assert_eq!(session.editors()[0].handler.title(), "New (100)");
}

#[test]
fn revocation_disables_on_the_next_query_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let anonymous = ActorId::anonymous();
    identity.grant(&anonymous, people::NEW_PERSON_PERM);
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();
    assert!(session.is_enabled(people::CMD_NEW_PERSON).unwrap());

    identity.revoke(&anonymous, &Capability::new(people::NEW_PERSON_PERM));

    assert!(!session.is_enabled(people::CMD_NEW_PERSON).unwrap());
    let row = session
        .menu_snapshot()
        .into_iter()
        .find(|row| row.command_id.as_deref() == Some(people::CMD_NEW_PERSON))
        .unwrap();
    assert!(!row.enabled);
    assert!(matches!(
        session.invoke(people::CMD_NEW_PERSON),
        Err(ShellError::NotAuthorized { .. })
    ));
    assert!(session.editors().is_empty());
}

#[test]
fn refused_command_never_runs_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let shell = Shell::builder(identity.clone())
        .contributor(Arc::new(StaticContributor::new("counter").command(
            GroupTarget::new("Tools", "main"),
            CommandProxy::new(
                Command::new("tools.count", "Count", move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    Vec::new()
                })
                .requiring(CapabilitySet::of(["CountPerm"])),
            ),
        )))
        .build()
        .unwrap();
    let mut session = shell.open_session().unwrap();

    for _ in 0..3 {
        assert!(session.invoke("tools.count").is_err());
    }
    assert_eq!(calls.load(Ordering::SeqCst), 0);

    identity.grant(&ActorId::anonymous(), "CountPerm");
    session.invoke("tools.count").unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[test]
fn two_sessions_get_four_distinct_view_instances_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let shell = workbench(&identity).build().unwrap();
    let mut first = shell.open_session().unwrap();
    let second = shell.open_session().unwrap();

    let mut ids: Vec<_> = first
        .views()
        .instances()
        .iter()
        .chain(second.views().instances())
        .map(|instance| instance.id())
        .collect();
    ids.sort_by_key(|id| id.to_string());
    ids.dedup();
    assert_eq!(ids.len(), 4);

    first
        .views_mut()
        .get_mut(people::VIEW_DEBUG)
        .and_then(|instance| instance.downcast_mut::<people::DebugView>())
        .unwrap()
        .push_line("only here");
    let untouched = second
        .views()
        .get(people::VIEW_DEBUG)
        .and_then(|instance| instance.downcast_ref::<people::DebugView>())
        .unwrap();
    assert!(untouched.lines().is_empty());
    assert_eq!(untouched.session(), second.id());
}

#[test]
fn foo_then_bar_layout_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();

    assert_eq!(
        session.placements(),
        vec![
            (people::VIEW_BLACK, &Anchor::Bottom),
            (people::VIEW_DEBUG, &Anchor::Left)
        ]
    );
    let black = session.views().get(people::VIEW_BLACK).unwrap().id();
    let debug = session.views().get(people::VIEW_DEBUG).unwrap().id();

    session.invoke(&layout_command_id(people::LAYOUT_BAR)).unwrap();

    assert_eq!(session.active_layout(), Some(people::LAYOUT_BAR));
    assert_eq!(session.placements(), vec![(people::VIEW_DEBUG, &Anchor::Left)]);
    assert_eq!(session.unplaced_views(), vec![people::VIEW_BLACK]);
    assert_eq!(session.views().get(people::VIEW_BLACK).unwrap().id(), black);
    assert_eq!(session.views().get(people::VIEW_DEBUG).unwrap().id(), debug);
}

#[test]
fn bad_layout_activation_leaves_arrangement_untouched_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = workbench(&identity)
        .layout(
            "Broken",
            vec![
                Placement::new(people::VIEW_BLACK, Anchor::Top),
                Placement::new(people::VIEW_DEBUG, Anchor::custom("dock").unwrap()),
            ],
        )
        .build()
        .unwrap()
        .open_session()
        .unwrap();

    let err = session.activate_layout("Broken").unwrap_err();
    assert!(matches!(err, ShellError::InvalidLayoutReference { .. }));
    assert!(err.is_configuration());
    assert_eq!(session.active_layout(), Some(people::LAYOUT_FOO));
    assert_eq!(
        session.views().get(people::VIEW_BLACK).unwrap().anchor(),
        Some(&Anchor::Bottom)
    );
}

#[test]
fn resolver_tiers_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let store = Arc::new(InMemoryHandlerStore::default());
    let mut session = workbench(&identity)
        .remembered_handlers(store.clone())
        .build()
        .unwrap()
        .open_session()
        .unwrap();
    let person = people::Person::new("Ada", 36).into_object();

    let overrides = HandlerChain::new().with(HandlerDescriptor::for_type::<people::Person, _>(
        "custom.person",
        |_, object| Box::new(Inspector(object.clone(), "custom.person")),
    ));
    let editor = session
        .edit_with(person.clone(), HandlerKind::editor(), Some(&overrides))
        .unwrap();
    assert_eq!(editor.handler_id, "custom.person");
    assert_eq!(editor.matched_by, MatchTier::Override);

    assert_eq!(store.remembered(person.key()).as_deref(), Some("custom.person"));

    session.close_editor(person.key()).unwrap();
    let editor = session.edit(person.clone(), HandlerKind::editor()).unwrap();
    assert_eq!(editor.handler_id, people::HANDLER_PERSON_FORM);
    assert_eq!(editor.matched_by, MatchTier::Standard);

    session.close_editor(person.key()).unwrap();
    let editor = session.edit(person.clone(), HandlerKind::editor()).unwrap();
    assert_eq!(editor.handler_id, people::HANDLER_PERSON_FORM);
    assert_eq!(editor.matched_by, MatchTier::Remembered);

    session.close_editor(person.key()).unwrap();
    let editor = session
        .edit_with(person, HandlerKind::editor(), Some(&overrides))
        .unwrap();
    assert_eq!(editor.handler_id, "custom.person");
    assert_eq!(editor.matched_by, MatchTier::Override);

    let note = ContentObject::new("note:1", String::from("hello"));
    let editor = session.edit(note, HandlerKind::editor()).unwrap();
    assert_eq!(editor.handler_id, people::HANDLER_TOOLKIT_EDITOR);
    assert_eq!(editor.matched_by, MatchTier::Fallback);
}

#[test]
fn unhandled_object_without_fallback_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = Shell::builder(identity)
        .handler(HandlerDescriptor::for_type::<people::Person, _>("form", |_, object| {
            Box::new(Inspector(object.clone(), "form"))
        }))
        .build()
        .unwrap()
        .open_session()
        .unwrap();

    let err = session
        .edit(ContentObject::new("n", 7_i64), HandlerKind::editor())
        .unwrap_err();
    assert!(matches!(err, ShellError::UnhandledObjectKind { .. }));
    assert!(!err.is_configuration());
    assert!(session.editors().is_empty());
}

#[test]
fn login_logout_follow_scenario() {
    let identity = Arc::new(
        InMemoryIdentitySource::new()
            .with_actor("admin", CapabilitySet::of([accounts::MANAGE_POLICY_PERM])),
    );
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();
    assert!(!session.is_enabled(accounts::CMD_MANAGE_POLICIES).unwrap());

    session.invoke(accounts::CMD_LOGIN).unwrap();
    assert_eq!(
        session.pump_identity_events(),
        vec![IdentityEvent::ActorChanged(ActorId::new("admin"))]
    );
    assert!(session.is_enabled(accounts::CMD_MANAGE_POLICIES).unwrap());
    assert!(!session.is_enabled(accounts::CMD_MANAGE_USERS).unwrap());

    session.invoke(accounts::CMD_LOGOUT).unwrap();
    session.pump_identity_events();
    assert_eq!(identity.current_actor(), ActorId::anonymous());
    assert!(!session.is_enabled(accounts::CMD_MANAGE_POLICIES).unwrap());
}

#[test]
fn logout_revokes_gates_before_events_are_pumped_scenario() {
    let identity = Arc::new(
        InMemoryIdentitySource::new()
            .with_actor("admin", CapabilitySet::of([people::NEW_PERSON_PERM])),
    );
    identity.login("admin");
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();
    assert!(session.is_enabled(people::CMD_NEW_PERSON).unwrap());

    session.invoke(accounts::CMD_LOGOUT).unwrap();

    assert_eq!(session.actor().id(), ActorId::anonymous());
    assert!(!session.is_enabled(people::CMD_NEW_PERSON).unwrap());
    assert!(matches!(
        session.invoke(people::CMD_NEW_PERSON),
        Err(ShellError::NotAuthorized { .. })
    ));
    assert!(session.editors().is_empty());
}

#[test]
fn exit_closes_session_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();

    session.invoke(people::CMD_EXIT).unwrap();

    assert!(session.is_closed());
    assert!(matches!(
        session.invoke(accounts::CMD_LOGIN),
        Err(ShellError::SessionClosed)
    ));
    assert!(matches!(
        session.edit(people::Person::new("Late", 1).into_object(), HandlerKind::editor()),
        Err(ShellError::SessionClosed)
    ));
}

#[test]
fn layout_activation_after_exit_is_refused_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let mut session = workbench(&identity).build().unwrap().open_session().unwrap();

    session.invoke(people::CMD_EXIT).unwrap();

    assert!(matches!(
        session.activate_layout(people::LAYOUT_BAR),
        Err(ShellError::SessionClosed)
    ));
    assert_eq!(session.active_layout(), Some(people::LAYOUT_FOO));
    assert_eq!(
        session.views().get(people::VIEW_BLACK).unwrap().anchor(),
        Some(&Anchor::Bottom)
    );
}

#[test]
fn menu_order_from_config_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let config = ShellConfig::from_toml_str(
        r#"
        default_layout = "Bar"
        [menu]
        order = ["User", "File"]
        [toolbar]
        show_tool_names = true
        "#,
    )
    .unwrap();
    let session = workbench(&identity)
        .with_config(&config)
        .build()
        .unwrap()
        .open_session()
        .unwrap();

    let menus: Vec<&str> = session.menu().branches().iter().map(|branch| branch.name()).collect();
    assert_eq!(menus, vec!["User", "File", "View"]);
    assert!(session.toolbar().show_tool_names());
    assert_eq!(session.active_layout(), Some(people::LAYOUT_BAR));
}

#[test]
fn duplicate_view_descriptor_aborts_construction_scenario() {
    let identity = Arc::new(InMemoryIdentitySource::new());
    let err = workbench(&identity)
        .view(gateshell::registries::atomic::view::ViewDescriptor::new(
            people::VIEW_BLACK,
            |_| Box::new(people::BlackView),
        ))
        .build()
        .unwrap_err();
    assert!(matches!(err, ShellError::DuplicateViewDescriptor(_)));
}
