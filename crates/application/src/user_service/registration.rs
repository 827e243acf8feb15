use tracing::{debug, info};

use wqp_domain::{DEFAULT_ROLE_LABEL, validate_password, validate_role_label};

use super::*;

impl UserService {
    /// Registers a user with a hashed credential.
    pub async fn register_user(&self, input: RegisterUserInput) -> AppResult<User> {
        let username = Username::new(input.username)?;
        let email = parse_optional_email(input.email)?;
        let role_label = validate_role_label(
            input
                .role_label
                .as_deref()
                .unwrap_or(DEFAULT_ROLE_LABEL),
        )?;
        validate_password(&input.password)?;

        self.ensure_username_available(&username, None).await?;

        let credential_hash = self.password_hasher.hash_password(&input.password)?;
        let user = self
            .user_repository
            .create_user(NewUserRecord {
                username,
                email,
                credential_hash,
                role_label,
            })
            .await?;

        info!(user_id = %user.id, username = user.username.as_str(), "user registered");
        Ok(user)
    }

    /// Registers each row independently.
    ///
    /// Rows rejected for invalid input or a taken username are reported and
    /// skipped. Any other failure stops the batch, as `PartialFailure` once a
    /// row has been created.
    pub async fn register_users(
        &self,
        inputs: Vec<RegisterUserInput>,
    ) -> AppResult<BatchRegistrationReport> {
        if inputs.is_empty() {
            return Err(AppError::Validation(
                "batch registration requires at least one user".to_owned(),
            ));
        }

        let total = inputs.len();
        let mut report = BatchRegistrationReport::default();
        for (index, input) in inputs.into_iter().enumerate() {
            let row = index + 1;
            let username = input.username.clone();

            match self.register_user(input).await {
                Ok(user) => report.created.push(user),
                Err(error @ (AppError::Validation(_) | AppError::DuplicateKey(_))) => {
                    debug!(row, error = %error, "batch row skipped");
                    report.failures.push(BatchRowFailure {
                        row,
                        username,
                        reason: error.to_string(),
                    });
                }
                Err(error) if report.created.is_empty() => return Err(error),
                Err(error) => {
                    return Err(AppError::PartialFailure(format!(
                        "batch registration stopped at row {row} after creating {} users: {error}",
                        report.created.len()
                    )));
                }
            }
        }

        info!(
            total,
            created = report.created.len(),
            failed = report.failures.len(),
            "batch registration finished"
        );
        Ok(report)
    }
}
