//! Integration tests for reference graph construction.

mod common;

use crossref::{
    Crossref, DiagnosticKind, EntityId, Member, MemberKind, Namespace, Project, Repository,
    Resolution, ResolveOptions, Solution, TypeDecl, TypeId, TypeOrigin,
};

fn run(repo: &crossref::Repository) -> Resolution {
    Crossref::new(ResolveOptions::default())
        .run(repo)
        .expect("resolution should succeed")
}

#[test]
fn external_call_target_and_member_are_synthesized_once() {
    let resolution = run(&common::external_calls());
    let graph = &resolution.graph;

    let foo = graph.type_by_name("Foo").expect("placeholder for Foo");
    let foo_type = graph.ty(foo).expect("entity");
    assert_eq!(foo_type.origin, TypeOrigin::External);

    let caller = graph.ty(graph.type_by_name("App.Caller").expect("declared")).expect("entity");
    let first = graph.member(caller.members[0]).expect("First");
    let second = graph.member(caller.members[1]).expect("Second");

    // Method(int) twice, Method(string) once.
    assert_eq!(first.calls[0].member, second.calls[0].member);
    assert_ne!(first.calls[0].member, first.calls[1].member);
    assert_eq!(graph.members_named(foo, "Method").len(), 2);
    assert_eq!(
        graph.member_display(first.calls[0].member).as_deref(),
        Some("Foo.Method(int)")
    );

    // One Foo, one int, one string.
    assert_eq!(graph.synthesized_types().filter(|t| t.full_name == "Foo").count(), 1);
    assert_eq!(resolution.stats.synthesized_members, 2);
    assert_eq!(resolution.stats.overload_mismatches, 0);
}

#[test]
fn references_to_one_declaration_compare_equal() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;
    let user = graph.type_by_name("Domain.Models.User").expect("declared");

    let service = graph.ty(graph.type_by_name("Services.UserService").expect("declared")).expect("entity");
    let program = graph.ty(graph.type_by_name("Cli.Program").expect("declared")).expect("entity");

    let save = graph.member(service.members[2]).expect("Save");
    let validate = graph.member(service.members[3]).expect("Validate");
    let main = graph.member(program.members[0]).expect("Main");

    assert_eq!(save.parameters[0].target, user);
    assert_eq!(validate.parameters[0].target, user);
    assert_eq!(main.calls[0].arguments[0].target, user);
    assert_eq!(service.base_types[0].arguments[0].target, user);
}

#[test]
fn calls_bind_to_declared_overloads_across_solutions() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;

    let service = graph.ty(graph.type_by_name("Services.UserService").expect("declared")).expect("entity");
    let program = graph.ty(graph.type_by_name("Cli.Program").expect("declared")).expect("entity");
    let save = graph.member(service.members[2]).expect("Save");

    assert_eq!(graph.member(program.members[0]).expect("Main").calls[0].member, save.id);
    // `Validate(User)` on this.
    assert_eq!(save.calls[0].member, service.members[3]);
    // `ILogger` is external, so its `Log(string)` is synthesized.
    let log = graph.member(save.calls[1].member).expect("Log");
    assert!(log.is_synthesized());
    assert_eq!(log.kind, MemberKind::Method);
    assert_eq!(graph.ty(log.owner).expect("owner").full_name, "ILogger");
}

#[test]
fn repeated_external_names_share_one_placeholder() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;

    let ints: Vec<TypeId> = graph
        .synthesized_types()
        .filter(|t| t.full_name == "int")
        .map(|t| t.id)
        .collect();
    assert_eq!(ints.len(), 1);

    let entity = graph.ty(graph.type_by_name("Domain.Models.Entity").expect("declared")).expect("entity");
    let service = graph.ty(graph.type_by_name("Services.UserService").expect("declared")).expect("entity");
    let id = graph.member(entity.members[0]).expect("Id");
    let cache = graph.member(service.members[0]).expect("cache");

    assert_eq!(id.value_type.as_ref().expect("typed").target, ints[0]);
    assert_eq!(cache.value_type.as_ref().expect("typed").arguments[0].target, ints[0]);
}

#[test]
fn generic_names_with_different_arity_are_different_placeholders() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;

    let list = graph.placeholder("List", 1).expect("List`1");
    let dictionary = graph.placeholder("Dictionary", 2).expect("Dictionary`2");

    assert_ne!(list, dictionary);
    assert!(graph.placeholder("List", 0).is_none());
}

#[test]
fn ambiguous_reference_becomes_placeholder_with_candidate_handles() {
    let resolution = run(&common::my_service());
    let graph = &resolution.graph;

    let controller = graph.ty(graph.type_by_name("Controllers.MyController").expect("declared")).expect("entity");
    let field = graph.member(controller.members[0]).expect("service");
    let target = graph.ty(field.value_type.as_ref().expect("typed").target).expect("entity");

    let expected = vec![
        graph.type_by_name("Project1.Services.MyService").expect("declared"),
        graph.type_by_name("Project2.Services.MyService").expect("declared"),
    ];
    assert_eq!(target.origin, TypeOrigin::Ambiguous { candidates: expected });
    assert_eq!(resolution.stats.ambiguous_types, 1);
    assert!(
        graph
            .diagnostics()
            .iter()
            .any(|d| d.kind == DiagnosticKind::Ambiguous && d.name == "MyService")
    );
}

#[test]
fn ambiguous_candidates_come_from_the_first_logged_site() {
    let holder = |name: &str| TypeDecl::class(name).with_member(Member::field("widget", "Widget"));
    let repo = Repository::new("repo")
        .with_solution(
            Solution::new("main").with_project(
                Project::new("App")
                    .with_namespace(Namespace::new("App.A").with_type(TypeDecl::class("Widget")))
                    .with_namespace(Namespace::new("App.B").with_type(TypeDecl::class("Widget")))
                    .with_namespace(Namespace::new("App.C").with_type(holder("Panel"))),
            ),
        )
        .with_solution(
            Solution::new("vendor")
                .with_project(
                    Project::new("Ui1").with_namespace(Namespace::new("Vendor1").with_type(TypeDecl::class("Widget"))),
                )
                .with_project(
                    Project::new("Ui2").with_namespace(Namespace::new("Vendor2").with_type(TypeDecl::class("Widget"))),
                ),
        )
        .with_solution(
            Solution::new("tools")
                .with_project(Project::new("Cli").with_namespace(Namespace::new("Cli").with_type(holder("Screen")))),
        );

    let resolution = run(&repo);
    let graph = &resolution.graph;
    let target_of = |owner: &str| {
        let ty = graph.ty(graph.type_by_name(owner).expect("declared")).expect("entity");
        graph.member(ty.members[0]).expect("widget").value_type.as_ref().expect("typed").target
    };

    // The Cli site saw four candidates at repository level, but the log
    // keeps the two App saw first and both sites share one placeholder.
    let logged = resolution.ambiguities.get("Widget").expect("logged");
    assert_eq!(logged.candidates, vec!["App.A.Widget", "App.B.Widget"]);

    let placeholder = target_of("App.C.Panel");
    assert_eq!(target_of("Cli.Screen"), placeholder);
    let expected = vec![
        graph.type_by_name("App.A.Widget").expect("declared"),
        graph.type_by_name("App.B.Widget").expect("declared"),
    ];
    assert_eq!(
        graph.ty(placeholder).expect("entity").origin,
        TypeOrigin::Ambiguous { candidates: expected }
    );
    assert_eq!(resolution.stats.ambiguous_types, 1);
}

#[test]
fn nested_types_link_to_their_declaring_type() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;

    let user = graph.type_by_name("Domain.Models.User").expect("declared");
    let address = graph.ty(graph.type_by_name("Domain.Models.User.Address").expect("declared")).expect("entity");

    assert_eq!(address.containing_type, Some(user));
    assert_eq!(address.name, "Address");
}

#[test]
fn type_parameters_are_owned_and_not_relation_participants() {
    let resolution = run(&common::sample());
    let graph = &resolution.graph;

    let repository = graph
        .ty(graph.declared_by_name("Domain.Models.IRepository", 1).expect("declared"))
        .expect("entity");
    let t = repository.generic_parameters[0];

    assert_eq!(
        graph.ty(t).expect("entity").origin,
        TypeOrigin::TypeParameter { owner: EntityId::Type(repository.id) }
    );
    assert!(!resolution.relations.contains(EntityId::Type(t)));
    assert!(graph.relation_entities().all(|e| e != EntityId::Type(t)));
}

#[test]
fn duplicate_full_names_resolve_to_first_declaration() {
    let repo = common::single_project(
        "App",
        vec![
            crossref::Namespace::new("App").with_type(crossref::TypeDecl::class("Twin")),
            crossref::Namespace::new("App").with_type(crossref::TypeDecl::class("Twin")),
        ],
    );

    let resolution = run(&repo);
    let graph = &resolution.graph;

    assert_eq!(graph.declared_type_count(), 2);
    assert_eq!(graph.type_by_name("App.Twin"), Some(graph.declared_types()[0].id));
}
