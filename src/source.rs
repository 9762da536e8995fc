//! Localized message resolution over a [`MessageStore`].

use serde::{
    Deserialize,
    Serialize,
};
use thiserror::Error;

use crate::format::{
    FormatError,
    MessageArg,
    format_template,
};
use crate::locale::Locale;
use crate::store::{
    MessageStore,
    StoreError,
};

/// Errors returned by a [`MessageSource`].
///
/// A missing translation is not an error; it resolves to the fallback template.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Message lookup failed: {0}")]
    Lookup(#[from] StoreError),

    #[error("Message formatting failed: {0}")]
    Format(#[from] FormatError),

    /// A resolvable with neither codes nor a default message.
    #[error("No message codes and no default message to resolve")]
    NoCandidates,
}

/// Decides which candidate of a [`MessageSourceResolvable`] wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FallbackPolicy {
    /// First candidate whose resolved text differs from the bare code.
    ///
    /// A stored translation equal to its own code is treated as unresolved.
    #[default]
    TextDiffers,
    /// First candidate that has a stored translation, whatever its text.
    StoreHit,
}

/// Ordered candidate codes sharing one argument list and default message.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MessageSourceResolvable {
    pub codes: Vec<String>,
    pub args: Vec<MessageArg>,
    pub default_message: Option<String>,
}

impl MessageSourceResolvable {
    #[must_use]
    pub fn new<I, S>(codes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self { codes: codes.into_iter().map(Into::into).collect(), ..Self::default() }
    }

    #[must_use]
    pub fn with_args(mut self, args: Vec<MessageArg>) -> Self {
        self.args = args;
        self
    }

    #[must_use]
    pub fn with_default_message(mut self, default_message: impl Into<String>) -> Self {
        self.default_message = Some(default_message.into());
        self
    }
}

/// Provider of localized text.
pub trait MessageSource {
    /// Resolves `code` for `locale`, falling back to `default_message` (or the
    /// code itself), and substitutes `args` into the winning template.
    fn get_message(
        &self,
        code: &str,
        args: &[MessageArg],
        default_message: Option<&str>,
        locale: &Locale,
    ) -> Result<String, ResolveError>;

    /// Same as [`MessageSource::get_message`] without a default message.
    fn get_message_without_default(
        &self,
        code: &str,
        args: &[MessageArg],
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        self.get_message(code, args, None, locale)
    }

    /// Resolves the first candidate code that yields a localized message.
    fn get_message_resolvable(
        &self,
        resolvable: &MessageSourceResolvable,
        locale: &Locale,
    ) -> Result<String, ResolveError>;
}

/// [`MessageSource`] backed by a message table.
///
/// Every call performs a fresh store lookup; the source keeps no other state.
#[derive(Debug, Clone)]
pub struct DbMessageSource<S> {
    /// Message table.
    store: S,
    /// Winner selection for multi-code lookups.
    policy: FallbackPolicy,
}

impl<S: MessageStore> DbMessageSource<S> {
    #[must_use]
    pub fn new(store: S) -> Self {
        Self { store, policy: FallbackPolicy::default() }
    }

    #[must_use]
    pub const fn with_policy(store: S, policy: FallbackPolicy) -> Self {
        Self { store, policy }
    }

    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub const fn policy(&self) -> FallbackPolicy {
        self.policy
    }

    /// Stored template for `code` in the locale's language, if any.
    fn lookup(&self, code: &str, locale: &Locale) -> Result<Option<String>, StoreError> {
        let lang = locale.iso3_language();
        let found = self.store.find_by_key_and_lang(code, lang)?;
        tracing::debug!(code, lang, hit = found.is_some(), "Message lookup");
        Ok(found.map(|message| message.text))
    }

    /// Resolvable lookup where a candidate wins on a store hit.
    fn resolve_by_store_hit(
        &self,
        resolvable: &MessageSourceResolvable,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        for code in &resolvable.codes {
            if let Some(template) = self.lookup(code, locale)? {
                return Ok(format_template(&template, &resolvable.args)?);
            }
        }
        exhausted(resolvable)
    }

    /// Resolvable lookup where a candidate wins when its text differs from the code.
    fn resolve_by_text(
        &self,
        resolvable: &MessageSourceResolvable,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        let default_message = resolvable.default_message.as_deref();
        for code in &resolvable.codes {
            let message = self.get_message(code, &resolvable.args, default_message, locale)?;
            if message != *code {
                return Ok(message);
            }
        }
        exhausted(resolvable)
    }
}

impl<S: MessageStore> MessageSource for DbMessageSource<S> {
    fn get_message(
        &self,
        code: &str,
        args: &[MessageArg],
        default_message: Option<&str>,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        let template = match self.lookup(code, locale)? {
            Some(text) => text,
            None => default_message.filter(|m| !m.is_empty()).unwrap_or(code).to_string(),
        };

        Ok(format_template(&template, args)?)
    }

    fn get_message_resolvable(
        &self,
        resolvable: &MessageSourceResolvable,
        locale: &Locale,
    ) -> Result<String, ResolveError> {
        match self.policy {
            FallbackPolicy::TextDiffers => self.resolve_by_text(resolvable, locale),
            FallbackPolicy::StoreHit => self.resolve_by_store_hit(resolvable, locale),
        }
    }
}

/// Result when no candidate resolved: the default message, else the last code.
fn exhausted(resolvable: &MessageSourceResolvable) -> Result<String, ResolveError> {
    if let Some(default_message) = resolvable.default_message.as_deref().filter(|m| !m.is_empty())
    {
        return Ok(format_template(default_message, &resolvable.args)?);
    }
    resolvable.codes.last().cloned().ok_or(ResolveError::NoCandidates)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use googletest::prelude::*;
    use rstest::*;

    use super::*;
    use crate::message::Message;
    use crate::store::InMemoryMessageStore;
    use crate::test_utils::{
        FailingStore,
        create_store,
        locale,
    };

    #[fixture]
    fn source() -> DbMessageSource<InMemoryMessageStore> {
        DbMessageSource::new(create_store(&[
            ("hello", "pol", "witaj świecie"),
            ("hello", "eng", "hello word"),
            ("greeting", "eng", "Hello, %s!"),
            ("b.present", "eng", "found it"),
            ("self.named", "eng", "self.named"),
            ("percent", "eng", "100%% sure"),
        ]))
    }

    /// get_message: stored text for the locale language
    #[rstest]
    #[case::polish("pl", "witaj świecie")]
    #[case::polish_region("pl-PL", "witaj świecie")]
    #[case::english("en", "hello word")]
    #[case::english_region("en_GB", "hello word")]
    #[case::three_letter("eng", "hello word")]
    fn test_stored_text_wins(
        source: DbMessageSource<InMemoryMessageStore>,
        #[case] tag: &str,
        #[case] expected: &str,
    ) {
        assert_that!(source.get_message("hello", &[], None, &locale(tag)), ok(eq(expected)));
    }

    /// get_message: unknown code returns the code
    #[rstest]
    fn test_missing_code_falls_back_to_code(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("missing.key", &[], None, &locale("en")),
            ok(eq("missing.key"))
        );
    }

    /// get_message: no row for the language returns the code
    #[rstest]
    fn test_missing_language_falls_back_to_code(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(source.get_message("hello", &[], None, &locale("de")), ok(eq("hello")));
    }

    /// get_message: default template is formatted
    #[rstest]
    fn test_missing_code_uses_default_template(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("missing.key", &["x".into()], Some("fallback-%s"), &locale("en")),
            ok(eq("fallback-x"))
        );
    }

    /// get_message: empty default counts as absent
    #[rstest]
    fn test_empty_default_falls_back_to_code(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("missing.key", &[], Some(""), &locale("en")),
            ok(eq("missing.key"))
        );
    }

    /// get_message: stored text wins over the default
    #[rstest]
    fn test_stored_text_beats_default(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("hello", &[], Some("fallback"), &locale("en")),
            ok(eq("hello word"))
        );
    }

    /// get_message: arguments in stored text
    #[rstest]
    fn test_args_substituted_into_stored_text(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("greeting", &["Ala".into()], None, &locale("en")),
            ok(eq("Hello, Ala!"))
        );
    }

    /// get_message: stored text formatted once
    #[rstest]
    fn test_stored_text_formatted_exactly_once(source: DbMessageSource<InMemoryMessageStore>) {
        // "100%% sure" -> "100% sure"; a second pass would fail on "% s".
        assert_that!(source.get_message("percent", &[], None, &locale("en")), ok(eq("100% sure")));
    }

    /// get_message: default template formatted once
    #[rstest]
    fn test_default_template_formatted_exactly_once(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("missing.key", &["5".into()], Some("%s%% done"), &locale("en")),
            ok(eq("5% done"))
        );
    }

    /// get_message: missing argument
    #[rstest]
    fn test_missing_argument_is_format_error(source: DbMessageSource<InMemoryMessageStore>) {
        assert_that!(
            source.get_message("greeting", &[], None, &locale("en")),
            err(eq(&ResolveError::Format(FormatError::MissingArgument {
                specifier: "%s".to_string()
            })))
        );
    }

    /// get_message: oversized width or precision in stored text
    #[rstest]
    #[case::width("%9000000000000000000s", FormatError::IllegalWidth("%9000000000000000000".to_string()))]
    #[case::precision("%.4000000000f", FormatError::PrecisionTooLarge("%.4000000000".to_string()))]
    fn test_oversized_stored_placeholder_is_format_error(
        #[case] template: &str,
        #[case] expected: FormatError,
    ) {
        let source = DbMessageSource::new(create_store(&[("k", "eng", template)]));

        assert_that!(
            source.get_message("k", &["x".into()], None, &locale("en")),
            err(eq(&ResolveError::Format(expected)))
        );
    }

    /// get_message: store failure
    #[rstest]
    fn test_store_failure_is_propagated() {
        let source = DbMessageSource::new(FailingStore);

        assert_that!(
            source.get_message("hello", &[], Some("fallback"), &locale("en")),
            err(eq(&ResolveError::Lookup(StoreError::Db("connection refused".to_string()))))
        );
    }

    /// get_message_without_default: same as no default
    #[rstest]
    fn test_without_default_matches_none_default(source: DbMessageSource<InMemoryMessageStore>) {
        let locale = locale("pl");

        assert_that!(
            source.get_message_without_default("hello", &[], &locale),
            ok(eq(&source.get_message("hello", &[], None, &locale).unwrap()))
        );
    }

    /// get_message: repeated calls
    #[rstest]
    fn test_repeated_resolution_is_stable(source: DbMessageSource<InMemoryMessageStore>) {
        let locale = locale("en");
        let first = source.get_message("greeting", &["Ala".into()], None, &locale).unwrap();
        let second = source.get_message("greeting", &["Ala".into()], None, &locale).unwrap();

        assert_that!(first, eq(&second));
    }

    /// get_message_resolvable: first present code wins
    #[rstest]
    #[case::text_differs(FallbackPolicy::TextDiffers)]
    #[case::store_hit(FallbackPolicy::StoreHit)]
    fn test_resolvable_skips_missing_codes(#[case] policy: FallbackPolicy) {
        let source = DbMessageSource::with_policy(
            create_store(&[("b.present", "eng", "found it")]),
            policy,
        );
        let resolvable = MessageSourceResolvable::new(["a.missing", "b.present"]);

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("found it")));
    }

    /// get_message_resolvable: exhausted chain with default
    #[rstest]
    #[case::text_differs(FallbackPolicy::TextDiffers)]
    #[case::store_hit(FallbackPolicy::StoreHit)]
    fn test_resolvable_exhausted_returns_default(#[case] policy: FallbackPolicy) {
        let source = DbMessageSource::with_policy(InMemoryMessageStore::new(), policy);
        let resolvable =
            MessageSourceResolvable::new(["a.missing", "b.missing"]).with_default_message("none");

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("none")));
    }

    /// get_message_resolvable: exhausted chain without default
    #[rstest]
    #[case::text_differs(FallbackPolicy::TextDiffers)]
    #[case::store_hit(FallbackPolicy::StoreHit)]
    fn test_resolvable_exhausted_without_default_returns_last_code(#[case] policy: FallbackPolicy) {
        let source = DbMessageSource::with_policy(InMemoryMessageStore::new(), policy);
        let resolvable = MessageSourceResolvable::new(["a.missing", "b.missing"]);

        assert_that!(
            source.get_message_resolvable(&resolvable, &locale("en")),
            ok(eq("b.missing"))
        );
    }

    /// get_message_resolvable: arguments shared by candidates
    #[rstest]
    fn test_resolvable_shares_args(source: DbMessageSource<InMemoryMessageStore>) {
        let resolvable =
            MessageSourceResolvable::new(["nope", "greeting"]).with_args(vec!["Ola".into()]);

        assert_that!(
            source.get_message_resolvable(&resolvable, &locale("en")),
            ok(eq("Hello, Ola!"))
        );
    }

    /// get_message_resolvable: TextDiffers skips text equal to its code
    #[rstest]
    fn test_text_differs_passes_over_translation_equal_to_code(
        source: DbMessageSource<InMemoryMessageStore>,
    ) {
        let resolvable = MessageSourceResolvable::new(["self.named", "b.present"]);

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("found it")));
    }

    /// get_message_resolvable: StoreHit accepts text equal to its code
    #[rstest]
    fn test_store_hit_accepts_translation_equal_to_code() {
        let source = DbMessageSource::with_policy(
            create_store(&[("self.named", "eng", "self.named"), ("b.present", "eng", "found it")]),
            FallbackPolicy::StoreHit,
        );
        let resolvable = MessageSourceResolvable::new(["self.named", "b.present"]);

        assert_that!(
            source.get_message_resolvable(&resolvable, &locale("en")),
            ok(eq("self.named"))
        );
    }

    /// get_message_resolvable: TextDiffers default wins at first miss
    #[rstest]
    fn test_text_differs_default_short_circuits_chain() {
        let source = DbMessageSource::new(create_store(&[("b.present", "eng", "found it")]));
        let resolvable =
            MessageSourceResolvable::new(["a.missing", "b.present"]).with_default_message("none");

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("none")));
    }

    /// get_message_resolvable: StoreHit default only after the chain
    #[rstest]
    fn test_store_hit_default_only_after_chain() {
        let source = DbMessageSource::with_policy(
            create_store(&[("b.present", "eng", "found it")]),
            FallbackPolicy::StoreHit,
        );
        let resolvable =
            MessageSourceResolvable::new(["a.missing", "b.present"]).with_default_message("none");

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("found it")));
    }

    /// get_message_resolvable: no codes and no default
    #[rstest]
    fn test_resolvable_without_candidates_is_an_error(
        source: DbMessageSource<InMemoryMessageStore>,
    ) {
        let resolvable = MessageSourceResolvable::new(Vec::<String>::new());

        assert_that!(
            source.get_message_resolvable(&resolvable, &locale("en")),
            err(eq(&ResolveError::NoCandidates))
        );
    }

    /// get_message_resolvable: no codes with default
    #[rstest]
    fn test_resolvable_without_candidates_uses_default(
        source: DbMessageSource<InMemoryMessageStore>,
    ) {
        let resolvable = MessageSourceResolvable::new(Vec::<String>::new())
            .with_args(vec![2.into()])
            .with_default_message("%d left");

        assert_that!(source.get_message_resolvable(&resolvable, &locale("en")), ok(eq("2 left")));
    }

    /// get_message_resolvable: store failure
    #[rstest]
    #[case::text_differs(FallbackPolicy::TextDiffers)]
    #[case::store_hit(FallbackPolicy::StoreHit)]
    fn test_resolvable_store_failure_is_propagated(#[case] policy: FallbackPolicy) {
        let source = DbMessageSource::with_policy(FailingStore, policy);
        let resolvable = MessageSourceResolvable::new(["a"]).with_default_message("none");

        assert!(matches!(
            source.get_message_resolvable(&resolvable, &locale("en")),
            Err(ResolveError::Lookup(_))
        ));
    }

    /// DbMessageSource: shared and borrowed stores
    #[rstest]
    fn test_source_over_shared_store() {
        let store = std::sync::Arc::new(InMemoryMessageStore::from_messages([Message::new(
            "hello",
            "pol",
            "witaj świecie",
        )]));
        let first = DbMessageSource::new(std::sync::Arc::clone(&store));
        let second = DbMessageSource::new(&*store);

        assert_that!(
            first.get_message("hello", &[], None, &locale("pl")),
            ok(eq("witaj świecie"))
        );
        assert_that!(
            second.get_message("hello", &[], None, &locale("pl")),
            ok(eq("witaj świecie"))
        );
    }

    /// FallbackPolicy: camelCase names
    #[rstest]
    fn test_fallback_policy_deserializes_camel_case() {
        let policy: FallbackPolicy = serde_json::from_str(r#""storeHit""#).unwrap();

        assert_that!(policy, eq(FallbackPolicy::StoreHit));
    }
}
