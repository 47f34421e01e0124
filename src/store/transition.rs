use log::info;

use crate::models::{CompanyContext, InterviewStage};

use super::{AppAction, AppStore, InterviewAction, InterviewStore};

const DEFAULT_COMPANY_NAME: &str = "Meta";
const DEFAULT_ROLE_SLUG: &str = "software-engineer";

/// Display name for the interviewing company: an explicit name wins, else the
/// slug with its first letter uppercased, else the default.
pub fn resolve_company_name(company_name: Option<&str>, company_slug: Option<&str>) -> String {
    if let Some(name) = company_name.filter(|name| !name.is_empty()) {
        return name.to_string();
    }
    match company_slug.filter(|slug| !slug.is_empty()) {
        Some(slug) => capitalize(slug),
        None => DEFAULT_COMPANY_NAME.to_string(),
    }
}

fn capitalize(slug: &str) -> String {
    let mut chars = slug.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// One-way move from the conversational stage into the coding stage: resolve
/// and dispatch the company context, force the coding stage, mirror it into
/// the legacy interview store, then let the caller reveal the IDE.
///
/// Safe to call more than once per transition; the target stage is simply
/// re-dispatched.
pub fn begin_coding_stage<F>(
    app_store: &AppStore,
    interview_store: &InterviewStore,
    context: &CompanyContext,
    reveal_coding_ui: F,
) where
    F: FnOnce(),
{
    let company_name = resolve_company_name(
        context.company_name.as_deref(),
        context.company_slug.as_deref(),
    );
    let role_slug = context
        .role_slug
        .clone()
        .unwrap_or_else(|| DEFAULT_ROLE_SLUG.to_string());

    info!("entering coding stage for {company_name} ({role_slug})");

    app_store.dispatch(AppAction::SetCompanyContext(CompanyContext {
        company_name: Some(company_name),
        company_slug: context.company_slug.clone(),
        role_slug: Some(role_slug),
    }));
    app_store.dispatch(AppAction::ForceCoding);

    // Parts of the UI still read the legacy store; keep it in step.
    interview_store.dispatch(InterviewAction::SetStage(InterviewStage::Coding));

    reveal_coding_ui();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_name_wins_over_slug() {
        assert_eq!(resolve_company_name(Some("Globex"), Some("meta")), "Globex");
    }

    #[test]
    fn slug_is_capitalized_when_name_is_unset() {
        assert_eq!(resolve_company_name(None, Some("meta")), "Meta");
        assert_eq!(resolve_company_name(None, Some("stripe")), "Stripe");
    }

    #[test]
    fn default_applies_when_both_are_unset() {
        assert_eq!(resolve_company_name(None, None), "Meta");
        assert_eq!(resolve_company_name(Some(""), None), "Meta");
    }

    #[test]
    fn transition_dispatches_context_stage_and_reveal() {
        let app_store = AppStore::new();
        let interview_store = InterviewStore::new();
        let context = CompanyContext {
            company_name: None,
            company_slug: Some("meta".to_string()),
            role_slug: None,
        };

        let mut revealed = false;
        begin_coding_stage(&app_store, &interview_store, &context, || revealed = true);

        assert!(revealed);
        assert_eq!(interview_store.state().stage, InterviewStage::Coding);

        let app_state = app_store.state();
        assert!(app_state.coding_forced);
        let company = app_state.company.expect("company context dispatched");
        assert_eq!(company.company_name.as_deref(), Some("Meta"));
        assert_eq!(company.role_slug.as_deref(), Some("software-engineer"));
    }

    #[test]
    fn transition_is_idempotent() {
        let app_store = AppStore::new();
        let interview_store = InterviewStore::new();
        let context = CompanyContext::default();

        begin_coding_stage(&app_store, &interview_store, &context, || {});
        let first = interview_store.state();
        begin_coding_stage(&app_store, &interview_store, &context, || {});

        assert_eq!(interview_store.state(), first);
        assert_eq!(interview_store.state().stage, InterviewStage::Coding);
    }
}
