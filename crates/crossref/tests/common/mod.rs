//! Shared fixtures for crossref integration tests.

#![allow(dead_code)]

use crossref::{CallSite, Member, Namespace, Project, Repository, Solution, TypeDecl};

/// Wrap namespaces into a one-solution, one-project repository.
pub fn single_project(project: &str, namespaces: Vec<Namespace>) -> Repository {
    let mut p = Project::new(project);
    p.namespaces = namespaces;
    Repository::new("repo").with_solution(Solution::new("main").with_project(p))
}

/// `Services.Class2` depends on `Class1`, declared in `Models`, through a
/// field, a parameter and two calls.
pub fn class1_class2() -> Repository {
    single_project(
        "App",
        vec![
            Namespace::new("Models").with_type(
                TypeDecl::class("Class1").with_member(Member::method("Load", ["int"], Some("Class1"))),
            ),
            Namespace::new("Services").with_type(
                TypeDecl::class("Class2")
                    .with_member(Member::field("source", "Class1"))
                    .with_member(
                        Member::method("Refresh", ["Class1"], None)
                            .with_call(CallSite::new("Class1", "Load", ["int"]))
                            .with_call(CallSite::new("Class1", "Load", ["int"])),
                    ),
            ),
        ],
    )
}

/// Three namespaces each declare `MyService`; `Controllers.MyController`
/// references it by its short name.
pub fn my_service() -> Repository {
    Repository::new("repo").with_solution(
        Solution::new("main")
            .with_project(Project::new("Project1").with_namespace(
                Namespace::new("Project1.Services").with_type(TypeDecl::class("MyService")),
            ))
            .with_project(Project::new("Project2").with_namespace(
                Namespace::new("Project2.Services").with_type(TypeDecl::class("MyService")),
            ))
            .with_project(
                Project::new("Web")
                    .with_namespace(Namespace::new("Controllers").with_type(
                        TypeDecl::class("MyController").with_member(Member::field("service", "MyService")),
                    )),
            ),
    )
}

/// A method calls `Foo.Method(2)` twice and `Foo.Method("x")` once; `Foo`
/// is declared nowhere.
pub fn external_calls() -> Repository {
    single_project(
        "App",
        vec![Namespace::new("App").with_type(
            TypeDecl::class("Caller")
                .with_member(
                    Member::method("First", Vec::<String>::new(), None)
                        .with_call(CallSite::new("Foo", "Method", ["int"]))
                        .with_call(CallSite::new("Foo", "Method", ["string"])),
                )
                .with_member(
                    Member::method("Second", Vec::<String>::new(), None)
                        .with_call(CallSite::new("Foo", "Method", ["int"])),
                ),
        )],
    )
}

/// A larger repository touching every reference kind: two solutions,
/// nested and generic types, inheritance, locals and calls.
pub fn sample() -> Repository {
    Repository::new("sample")
        .with_solution(
            Solution::new("Core")
                .with_project(
                    Project::new("Domain")
                        .with_namespace(
                            Namespace::new("Domain.Models")
                                .with_type(TypeDecl::class("Entity").with_member(Member::property("Id", "int")))
                                .with_type(
                                    TypeDecl::class("User")
                                        .with_base("Entity")
                                        .with_member(Member::property("Name", "string"))
                                        .with_member(Member::property("Address", "Address")),
                                )
                                .with_type(TypeDecl::class("Address").nested_in("User"))
                                .with_type(TypeDecl::interface("IRepository").with_generic("T").with_member(
                                    Member::method("Save", ["T"], Some("bool")),
                                )),
                        ),
                )
                .with_project(
                    Project::new("Services").with_namespace(
                        Namespace::new("Services").with_type(
                            TypeDecl::class("UserService")
                                .with_base("IRepository<User>")
                                .with_member(Member::field("cache", "Dictionary<int,User>"))
                                .with_member(Member::constructor("UserService", ["ILogger"]))
                                .with_member(
                                    Member::method("Save", ["User"], Some("bool"))
                                        .with_local("List<User>")
                                        .with_call(CallSite::new("", "Validate", ["User"]))
                                        .with_call(CallSite::new("ILogger", "Log", ["string"])),
                                )
                                .with_member(Member::method("Validate", ["User"], None)),
                        ),
                    ),
                ),
        )
        .with_solution(Solution::new("Tools").with_project(
            Project::new("Cli").with_namespace(Namespace::new("Cli").with_type(
                TypeDecl::class("Program").with_member(
                    Member::method("Main", ["string[]"], None)
                        .with_local("UserService")
                        .with_call(CallSite::new("UserService", "Save", ["User"])),
                ),
            )),
        ))
}
