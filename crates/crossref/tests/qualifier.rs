//! Integration tests for scope-chain qualification.

mod common;

use crossref::{Crossref, Member, Namespace, Project, Repository, ResolveOptions, Solution, TypeDecl};
use rstest::rstest;

fn qualify(repo: &Repository) -> crossref::QualifiedModel {
    Crossref::new(ResolveOptions::default())
        .qualify(repo)
        .expect("qualification should succeed")
}

fn member_type<'a>(repo: &'a Repository, type_name: &str, member: &str) -> Option<&'a str> {
    repo.find_type(type_name)
        .and_then(|t| t.members.iter().find(|m| m.name == member))
        .and_then(|m| m.value_type.as_deref())
}

#[test]
fn ambiguous_short_name_is_kept_and_logged_with_every_candidate() {
    let qualified = qualify(&common::my_service());

    assert_eq!(
        member_type(&qualified.repository, "Controllers.MyController", "service"),
        Some("MyService")
    );
    assert_eq!(qualified.ambiguities.len(), 1);
    let entry = qualified.ambiguities.get("MyService").expect("MyService should be logged");
    assert_eq!(
        entry.candidates,
        vec!["Project1.Services.MyService", "Project2.Services.MyService"]
    );
}

#[test]
fn ambiguous_name_is_logged_once_per_run() {
    let mut repo = common::my_service();
    let controllers = &mut repo.solutions[0].projects[2].namespaces[0];
    controllers.types.push(
        TypeDecl::class("OtherController")
            .with_member(Member::field("a", "MyService"))
            .with_member(Member::method("Use", ["MyService", "MyService"], Some("MyService"))),
    );

    let qualified = qualify(&repo);

    assert_eq!(qualified.ambiguities.len(), 1);
    assert_eq!(qualified.ambiguities.entries()[0].candidates.len(), 2);
    assert_eq!(qualified.stats.ambiguous, 5);
}

#[test]
fn namespace_match_is_never_overridden_by_wider_scopes() {
    let repo = Repository::new("repo")
        .with_solution(
            Solution::new("main")
                .with_project(
                    Project::new("App")
                        .with_namespace(
                            Namespace::new("App.Local")
                                .with_type(TypeDecl::class("Helper"))
                                .with_type(TypeDecl::class("User").with_member(Member::field("helper", "Helper"))),
                        )
                        .with_namespace(Namespace::new("App.Other").with_type(TypeDecl::class("Helper"))),
                )
                .with_project(Project::new("Lib").with_namespace(
                    Namespace::new("Lib").with_type(TypeDecl::class("Helper")),
                )),
        );

    let qualified = qualify(&repo);

    assert_eq!(
        member_type(&qualified.repository, "App.Local.User", "helper"),
        Some("App.Local.Helper")
    );
    assert!(qualified.ambiguities.is_empty());
}

#[test]
fn search_stops_at_first_level_with_candidates() {
    // Two project-level candidates mask the third one in another solution.
    let repo = Repository::new("repo")
        .with_solution(
            Solution::new("main").with_project(
                Project::new("App")
                    .with_namespace(Namespace::new("App.A").with_type(TypeDecl::class("Widget")))
                    .with_namespace(Namespace::new("App.B").with_type(TypeDecl::class("Widget")))
                    .with_namespace(
                        Namespace::new("App.C")
                            .with_type(TypeDecl::class("Panel").with_member(Member::field("widget", "Widget"))),
                    ),
            ),
        )
        .with_solution(Solution::new("vendor").with_project(
            Project::new("Ui").with_namespace(Namespace::new("Ui").with_type(TypeDecl::class("Widget"))),
        ));

    let qualified = qualify(&repo);

    assert_eq!(member_type(&qualified.repository, "App.C.Panel", "widget"), Some("Widget"));
    assert_eq!(
        qualified.ambiguities.get("Widget").expect("logged").candidates,
        vec!["App.A.Widget", "App.B.Widget"]
    );
}

#[test]
fn same_namespace_in_two_projects_collapses_to_one_candidate() {
    let repo = Repository::new("repo").with_solution(
        Solution::new("main")
            .with_project(Project::new("One").with_namespace(
                Namespace::new("Shared").with_type(TypeDecl::class("Clock")),
            ))
            .with_project(Project::new("Two").with_namespace(
                Namespace::new("Shared").with_type(TypeDecl::class("Clock")),
            ))
            .with_project(Project::new("Three").with_namespace(
                Namespace::new("Use").with_type(TypeDecl::class("Timer").with_member(Member::field("clock", "Clock"))),
            )),
    );

    let qualified = qualify(&repo);

    assert_eq!(member_type(&qualified.repository, "Use.Timer", "clock"), Some("Shared.Clock"));
    assert!(qualified.ambiguities.is_empty());
}

#[rstest]
#[case::nested_type("Domain.Models.User", "Address", "Domain.Models.User.Address")]
#[case::base_type_member("Domain.Models.Entity", "Id", "int")]
#[case::generic_arguments("Services.UserService", "cache", "Dictionary<int,Domain.Models.User>")]
fn sample_members_are_qualified(#[case] owner: &str, #[case] member: &str, #[case] expected: &str) {
    let qualified = qualify(&common::sample());

    assert_eq!(member_type(&qualified.repository, owner, member), Some(expected));
}

#[test]
fn base_types_and_call_targets_are_qualified() {
    let qualified = qualify(&common::sample());
    let service = qualified.repository.find_type("Services.UserService").expect("declared");
    let program = qualified.repository.find_type("Cli.Program").expect("declared");

    assert_eq!(
        service.base_types,
        vec!["Domain.Models.IRepository<Domain.Models.User>"]
    );
    assert_eq!(program.members[0].local_variables, vec!["Services.UserService"]);
    assert_eq!(program.members[0].calls[0].target_type, "Services.UserService");
    assert_eq!(program.members[0].calls[0].parameter_types, vec!["Domain.Models.User"]);
    assert_eq!(program.members[0].parameters, vec!["string[]"]);
}

#[test]
fn every_type_receives_its_full_name() {
    let qualified = qualify(&common::sample());

    let names: Vec<&str> = qualified
        .repository
        .types()
        .filter_map(|t| t.full_name.as_deref())
        .collect();
    assert_eq!(names.len(), qualified.repository.type_count());
    assert!(names.contains(&"Domain.Models.User.Address"));
    assert!(names.contains(&"Domain.Models.IRepository"));
}

#[test]
fn qualifying_a_qualified_model_changes_nothing() {
    for repo in [common::sample(), common::my_service(), common::class1_class2()] {
        let once = qualify(&repo);
        let twice = qualify(&once.repository);

        assert_eq!(twice.repository, once.repository);
        assert_eq!(twice.stats.resolved, 0);
        assert_eq!(twice.ambiguities, once.ambiguities);
    }
}
