use super::ui;
use crate::app::App;
use crate::core::NewUser;
use anyhow::{Result, bail};
use tracing::info;

/// Form-level checks applied before a registration reaches the directory.
pub fn validate_registration(profile: &NewUser, password: &str) -> Result<()> {
    if profile.name.trim().chars().count() < 2 {
        bail!("Name must be at least 2 characters");
    }
    if profile.surname.trim().chars().count() < 2 {
        bail!("Surname must be at least 2 characters");
    }
    match profile.email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {}
        _ => bail!("Invalid email address: {}", profile.email),
    }
    if password.chars().count() < 6 {
        bail!("Password must be at least 6 characters");
    }
    if profile.document_number.is_empty()
        || !profile.document_number.chars().all(|c| c.is_ascii_digit())
    {
        bail!("Document number must contain only digits");
    }
    if profile.phone.len() != 10 || !profile.phone.chars().all(|c| c.is_ascii_digit()) {
        bail!("Phone number must be exactly 10 digits");
    }
    Ok(())
}

pub async fn login(app: &mut App, email: &str, password: &str) -> Result<()> {
    ui::simulate_latency(app.latency, "Signing in...").await;
    let user = app.directory.authenticate(email, password).await?;
    info!("Logged in as {}", user.email);
    println!(
        "Welcome back, {}!",
        ui::style_text(&format!("{} {}", user.name, user.surname), ui::StyleType::Title)
    );
    Ok(())
}

pub async fn register(app: &mut App, profile: NewUser, password: &str) -> Result<()> {
    validate_registration(&profile, password)?;
    ui::simulate_latency(app.latency, "Creating account...").await;
    let user = app.directory.register(profile, password).await?;
    info!("Registered {}", user.email);
    println!(
        "Account created for {}. Starting balance: {}",
        ui::style_text(&user.email, ui::StyleType::Title),
        ui::style_text(
            &format!("${}", crate::core::money::format_amount(&user.balance)),
            ui::StyleType::TotalValue
        )
    );
    Ok(())
}

pub async fn logout(app: &mut App) -> Result<()> {
    app.directory.logout().await?;
    info!("Logged out");
    println!("{}", ui::style_text("Session closed", ui::StyleType::Subtle));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::DocumentType;

    fn profile() -> NewUser {
        NewUser {
            name: "Ana".to_string(),
            surname: "Gomez".to_string(),
            email: "ana@example.com".to_string(),
            document_type: DocumentType::CitizenId,
            document_number: "1020304050".to_string(),
            phone: "3001234567".to_string(),
        }
    }

    #[test]
    fn test_valid_registration_passes() {
        assert!(validate_registration(&profile(), "secret1").is_ok());
    }

    #[test]
    fn test_registration_rejects_bad_fields() {
        let with = |mutate: fn(&mut NewUser)| {
            let mut p = profile();
            mutate(&mut p);
            p
        };
        let cases = vec![
            (with(|p| p.name = "A".to_string()), "Name"),
            (with(|p| p.surname = " ".to_string()), "Surname"),
            (with(|p| p.email = "ana.example.com".to_string()), "email"),
            (with(|p| p.email = "@example.com".to_string()), "email"),
            (with(|p| p.document_number = "12a4".to_string()), "Document"),
            (with(|p| p.phone = "300123".to_string()), "Phone"),
            (with(|p| p.phone = "30012345ab".to_string()), "Phone"),
        ];

        for (p, expected) in cases {
            let err = validate_registration(&p, "secret1").unwrap_err();
            assert!(
                err.to_string().contains(expected),
                "expected '{expected}' in '{err}'"
            );
        }
    }

    #[test]
    fn test_registration_rejects_short_password() {
        let err = validate_registration(&profile(), "12345").unwrap_err();
        assert!(err.to_string().contains("Password"));
    }
}
