//! The canonical blog application scenarios.

use crate::auth::{LOGIN_HEADING, WRONG_CREDENTIALS};
use crate::locator::Role;
use crate::scenario::{Scenario, ScenarioGroup, Setup, Step, Suite, Target};
use crate::seed::NewUser;

fn usertest() -> NewUser {
    NewUser::new("usertest", "test1", "1234")
}

fn testuser() -> NewUser {
    NewUser::new("testuser", "test", "1234")
}

fn otheruser() -> NewUser {
    NewUser::new("otheruser", "other", "4321")
}

/// Login, blog creation, likes, deletion, ownership and ordering
#[must_use]
pub fn blog_app_suite() -> Suite {
    Suite::new()
        .group(landing())
        .group(login())
        .group(logged_in())
        .group(ownership())
        .group(ordering())
}

fn landing() -> ScenarioGroup {
    ScenarioGroup::new("Blog app", Setup::new()).scenario(
        Scenario::new("login form is shown")
            .step(Step::expect_text(LOGIN_HEADING))
            .step(Step::ExpectVisible(Target::role(Role::Button, "login")))
            .step(Step::ExpectLoggedOut),
    )
}

fn login() -> ScenarioGroup {
    ScenarioGroup::new("Login", Setup::new().with_user(usertest()))
        .scenario(
            Scenario::new("succeeds with correct credentials")
                .step(Step::login("usertest", "1234"))
                .step(Step::expect_logged_in("test1")),
        )
        .scenario(
            Scenario::new("fails with wrong credentials")
                .step(Step::login("testuser", "wrong"))
                .step(Step::expect_text(WRONG_CREDENTIALS))
                .step(Step::expect_no_text("logged in"))
                .step(Step::ExpectLoggedOut),
        )
}

fn logged_in() -> ScenarioGroup {
    ScenarioGroup::new(
        "when logged in",
        Setup::new()
            .with_user(usertest())
            .with_login("usertest", "1234"),
    )
    .scenario(
        Scenario::new("a new blog can be created")
            .step(Step::create_blog("first blog"))
            .step(Step::expect_text("first blog")),
    )
    .scenario(
        Scenario::new("user likes blog")
            .step(Step::create_blog("liked blog"))
            .step(Step::view("liked blog"))
            .step(Step::like("liked blog", 1))
            .step(Step::expect_text("likes 1")),
    )
    .scenario(
        Scenario::new("create and delete blog")
            .step(Step::create_blog("delete this blog"))
            .step(Step::view("delete this blog"))
            .step(Step::ExpectVisible(Target::button_in(
                "remove",
                "delete this blog",
            )))
            .step(Step::remove("delete this blog"))
            .step(Step::expect_no_text("delete this blog"))
            .step(Step::ExpectHidden(Target::role(Role::Button, "remove")))
            .step(Step::expect_no_text("delete this blog")),
    )
}

fn ownership() -> ScenarioGroup {
    let title = "blog by testuser";
    ScenarioGroup::new(
        "only creator can see delete button",
        Setup::new().with_user(testuser()).with_user(otheruser()),
    )
    .scenario(
        Scenario::new("only the user who added the blog sees the delete button")
            .step(Step::login("testuser", "1234"))
            .step(Step::expect_logged_in("test"))
            .step(Step::create_blog(title))
            .step(Step::view(title))
            .step(Step::ExpectVisible(Target::button_in("remove", title)))
            .step(Step::Logout)
            .step(Step::ExpectLoggedOut)
            .step(Step::login("otheruser", "4321"))
            .step(Step::expect_logged_in("other"))
            .step(Step::view(title))
            .step(Step::ExpectHidden(Target::button_in("remove", title)))
            .step(Step::Logout)
            .step(Step::login("testuser", "1234"))
            .step(Step::expect_logged_in("test"))
            .step(Step::view(title))
            .step(Step::ExpectVisible(Target::button_in("remove", title))),
    )
}

fn ordering() -> ScenarioGroup {
    ScenarioGroup::new(
        "blogs are listed by likes in descending order",
        Setup::new()
            .with_user(testuser())
            .with_login("testuser", "1234"),
    )
    .scenario(
        Scenario::new("blogs are arranged by likes in descending order")
            .step(Step::create_blog("first blog"))
            .step(Step::create_blog("second blog"))
            .step(Step::create_blog("third blog"))
            .step(Step::view("second blog"))
            .step(Step::like("second blog", 2))
            .step(Step::view("first blog"))
            .step(Step::like("first blog", 1))
            .step(Step::view("third blog"))
            .step(Step::expect_order(["second blog", "first blog", "third blog"]))
            .step(Step::ExpectLikesRanked),
    )
}
