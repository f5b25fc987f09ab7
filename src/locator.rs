use camino::Utf8PathBuf;
use url::Url;

/// Turns a resource locator handed to [`Processor::submit`](crate::Processor::submit)
/// into a filesystem path.
pub trait Resolve: Send {
    fn resolve(&self, locator: &str) -> Utf8PathBuf;
}

impl<F> Resolve for F
where
    F: Fn(&str) -> Utf8PathBuf + Send,
{
    fn resolve(&self, locator: &str) -> Utf8PathBuf {
        self(locator)
    }
}

/// Accepts `file://` URLs and plain paths.
///
/// Local file URLs become the path they name. Anything else, including file
/// URLs on a remote host, is taken as a path verbatim.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileUrl;

impl Resolve for FileUrl {
    fn resolve(&self, locator: &str) -> Utf8PathBuf {
        let url = match Url::parse(locator) {
            Ok(url) if url.scheme() == "file" => url,
            _ => return Utf8PathBuf::from(locator),
        };

        match url.to_file_path().map(Utf8PathBuf::try_from) {
            Ok(Ok(path)) => path,
            _ => {
                tracing::warn!("{locator} doesn't name a local UTF-8 path");
                Utf8PathBuf::from(locator)
            }
        }
    }
}
