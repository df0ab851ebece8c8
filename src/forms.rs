use crate::error::FormError;

pub const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterField {
    FullName,
    Email,
    Password,
    ConfirmPassword,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegisterForm {
    pub fullname: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

fn require(value: &str, label: &'static str) -> Result<(), FormError> {
    if value.trim().is_empty() {
        Err(FormError::EmptyField(label))
    } else {
        Ok(())
    }
}

fn check_email(email: &str) -> Result<(), FormError> {
    require(email, "Email")?;
    let email = email.trim();
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') && !domain.ends_with('.') => Ok(()),
        _ => Err(FormError::InvalidEmail),
    }
}

impl LoginForm {
    pub fn validate(&self) -> Result<(), FormError> {
        check_email(&self.email)?;
        require(&self.password, "Password")
    }
}

impl RegisterForm {
    pub fn set(&mut self, field: RegisterField, value: String) {
        match field {
            RegisterField::FullName => self.fullname = value,
            RegisterField::Email => self.email = value,
            RegisterField::Password => self.password = value,
            RegisterField::ConfirmPassword => self.confirm_password = value,
        }
    }

    pub fn validate(&self) -> Result<(), FormError> {
        require(&self.fullname, "Full name")?;
        check_email(&self.email)?;
        require(&self.password, "Password")?;
        if self.password != self.confirm_password {
            return Err(FormError::PasswordMismatch);
        }
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(FormError::PasswordTooShort(MIN_PASSWORD_LEN));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn register_form() -> RegisterForm {
        RegisterForm {
            fullname: "Grace Hopper".into(),
            email: "grace@example.com".into(),
            password: "cobol60".into(),
            confirm_password: "cobol60".into(),
        }
    }

    #[test]
    fn test_login_validation() {
        let mut form = LoginForm::default();
        assert_eq!(form.validate(), Err(FormError::EmptyField("Email")));

        form.email = "not-an-email".into();
        assert_eq!(form.validate(), Err(FormError::InvalidEmail));

        form.email = "ada@example.com".into();
        assert_eq!(form.validate(), Err(FormError::EmptyField("Password")));

        form.password = "x".into();
        assert_eq!(form.validate(), Ok(()));
    }

    #[test]
    fn test_register_validation() {
        assert_eq!(register_form().validate(), Ok(()));

        let mut form = register_form();
        form.fullname = "  ".into();
        assert_eq!(form.validate(), Err(FormError::EmptyField("Full name")));

        let mut form = register_form();
        form.confirm_password = "cobol61".into();
        assert_eq!(form.validate(), Err(FormError::PasswordMismatch));

        let mut form = register_form();
        form.password = "abc".into();
        form.confirm_password = "abc".into();
        assert_eq!(form.validate(), Err(FormError::PasswordTooShort(6)));
    }

    #[test]
    fn test_email_shapes() {
        assert!(check_email("a@b.co").is_ok());
        assert!(check_email("@b.co").is_err());
        assert!(check_email("a@localhost").is_err());
        assert!(check_email("a@b.").is_err());
    }

    #[test]
    fn test_set_field() {
        let mut form = RegisterForm::default();
        form.set(RegisterField::ConfirmPassword, "pw".into());
        form.set(RegisterField::FullName, "Ada".into());
        assert_eq!(form.confirm_password, "pw");
        assert_eq!(form.fullname, "Ada");
    }
}
