//! Enrichment ports: media upload and link archiving.
//!
//! Enrichment workers spawned by the platform adapter call these while a
//! message is still unready, filling in the `uploaded_url` /
//! `archived_url` span fields. Both traits use boxed futures so a
//! workflow can carry them as `Arc<dyn ...>` trait objects.

use futures_util::future::BoxFuture;
use gazette_types::error::EnrichError;

/// Uploads media bytes somewhere publicly reachable.
pub trait MediaStore: Send + Sync {
    /// Upload `bytes` under `name`, returning the public URL.
    fn upload<'a>(
        &'a self,
        name: &'a str,
        bytes: Vec<u8>,
    ) -> BoxFuture<'a, Result<String, EnrichError>>;
}

/// Takes an archival snapshot of a referenced URL.
pub trait WebArchiver: Send + Sync {
    /// Archive `url`, returning the URL of the archived copy.
    fn archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, EnrichError>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl WebArchiver for Echo {
        fn archive<'a>(&'a self, url: &'a str) -> BoxFuture<'a, Result<String, EnrichError>> {
            Box::pin(async move { Ok(format!("https://archive.invalid/{url}")) })
        }
    }

    #[tokio::test]
    async fn archiver_usable_as_trait_object() {
        let archiver: std::sync::Arc<dyn WebArchiver> = std::sync::Arc::new(Echo);
        let copy = archiver.archive("example.com").await.unwrap();
        assert_eq!(copy, "https://archive.invalid/example.com");
    }
}
