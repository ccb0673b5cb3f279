use crate::collection::Collection;
use crate::resolver::Resolver;
use crate::version::Version;

/// Resolves `first`/`earliest` to the first version and `last`/`latest` to
/// the last version of the current order, regardless of applied state.
/// Keywords are case-insensitive.
#[derive(Debug, Clone, Copy, Default)]
pub struct FirstLastResolver;

impl Resolver for FirstLastResolver {
    fn name(&self) -> String {
        "FirstLastResolver".to_string()
    }

    fn resolve(&self, alias: &str, collection: &Collection) -> Option<Version> {
        let keyword = alias.to_ascii_lowercase();
        match keyword.as_str() {
            "first" | "earliest" => collection.first().cloned(),
            "last" | "latest" => collection.last().cloned(),
            _ => None,
        }
    }
}
