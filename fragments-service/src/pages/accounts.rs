use super::{escape, input, layout, HtmlPage};
use crate::auth::Viewer;
use crate::forms::{FieldErrors, RegisterForm};

pub fn home_page(viewer: &Viewer) -> HtmlPage {
    let greeting = match viewer.username() {
        Some(username) => format!(
            r#"<p>Welcome back, {}. Head to your <a href="/dashboard">dashboard</a> to write something.</p>"#,
            escape(username)
        ),
        None => r#"<p><a href="/login">Log in</a> to add fragments, or <a href="/fragments">browse</a> what is already here.</p>"#.to_string(),
    };
    let content = format!(
        r#"<h1>Fragments</h1>
<p class="lead">Short, tagged, dated pieces of text.</p>
{greeting}"#
    );
    layout(viewer, "Home", &content)
}

pub fn register_page(viewer: &Viewer, form: &RegisterForm, errors: &FieldErrors) -> HtmlPage {
    let content = format!(
        r#"<h1>Register</h1>
<form method="post" action="/register" class="stacked">
{code}
{name}
{email}
{username}
{password}
{confirm}
<button type="submit">Register</button>
</form>"#,
        code = input("Access code", "code", "text", &form.code, errors),
        name = input("Name", "name", "text", &form.name, errors),
        email = input("Email", "email", "email", &form.email, errors),
        username = input("Username", "username", "text", &form.username, errors),
        password = input("Password", "password", "password", "", errors),
        confirm = input("Confirm password", "confirm", "password", "", errors),
    );
    layout(viewer, "Register", &content)
}

pub fn login_page(viewer: &Viewer, username: &str, error: Option<&str>) -> HtmlPage {
    let error = error
        .map(|msg| format!(r#"<div class="flash flash-danger">{}</div>"#, escape(msg)))
        .unwrap_or_default();
    let none = FieldErrors::new();
    let content = format!(
        r#"<h1>Login</h1>
{error}
<form method="post" action="/login" class="stacked">
{username}
{password}
<button type="submit">Login</button>
</form>"#,
        username = input("Username", "username", "text", username, &none),
        password = input("Password", "password", "password", "", &none),
    );
    layout(viewer, "Login", &content)
}

pub fn error_page(viewer: &Viewer, message: &str) -> HtmlPage {
    let content = format!(
        r#"<h1>Something went wrong</h1>
<p class="error">{}</p>
<p><a href="/">Back to the start</a></p>"#,
        escape(message)
    );
    layout(viewer, "Error", &content)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_page_keeps_input_and_shows_errors() {
        let form = RegisterForm {
            name: "<b>Ada</b>".to_string(),
            password: "secret".to_string(),
            ..RegisterForm::default()
        };
        let mut errors = FieldErrors::new();
        errors.insert("username", "Field must be between 4 and 10 characters long.".to_string());

        let page = register_page(&Viewer::default(), &form, &errors);
        assert!(page.html.contains(r#"value="&lt;b&gt;Ada&lt;/b&gt;""#));
        assert!(page.html.contains("Field must be between 4 and 10 characters long."));
        assert!(!page.html.contains("secret"));
    }

    #[test]
    fn test_login_page_error() {
        let page = login_page(&Viewer::default(), "ada", Some("Invalid login"));
        assert!(page.html.contains("Invalid login"));
        assert!(page.html.contains(r#"value="ada""#));
    }
}
