use std::{fs, path::PathBuf};

use ureq::Agent;

use crate::error::FetchError;

/// Where the raw store list body comes from.
pub trait StoreSource {
    fn fetch(&self) -> Result<String, FetchError>;
}

pub struct HttpSource {
    agent: Agent,
    url: String,
}

impl HttpSource {
    pub fn new(agent: Agent, url: impl Into<String>) -> Self {
        Self {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

impl StoreSource for HttpSource {
    fn fetch(&self) -> Result<String, FetchError> {
        // non-2xx responses come back from ureq as errors
        let body = self.agent.get(&self.url).call().map_err(Box::new)?.into_string()?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

/// Reads a saved response, for offline use.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl StoreSource for FileSource {
    fn fetch(&self) -> Result<String, FetchError> {
        let body = fs::read_to_string(&self.path).map_err(|source| FetchError::File {
            path: self.path.clone(),
            source,
        })?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use std::env;

    use super::*;
    use crate::test_server;

    #[test]
    fn http_ok() {
        let url = test_server::serve("200 OK", r#"{"storeList": {}}"#);
        let source = HttpSource::new(Agent::new(), format!("{url}/stores"));
        assert_eq!(source.fetch().unwrap(), r#"{"storeList": {}}"#);
    }

    #[test]
    fn http_error_status() {
        let url = test_server::serve("500 Internal Server Error", "oops");
        let source = HttpSource::new(Agent::new(), format!("{url}/stores"));
        assert!(matches!(source.fetch(), Err(FetchError::Http(_))));
    }

    #[test]
    fn http_empty_body() {
        let url = test_server::serve("200 OK", "");
        let source = HttpSource::new(Agent::new(), format!("{url}/stores"));
        assert!(matches!(source.fetch(), Err(FetchError::EmptyBody)));
    }

    #[test]
    fn file() {
        let path = env::temp_dir().join(format!("storemap-fetch-{}.json", std::process::id()));
        fs::write(&path, r#"{"storeList": {}}"#).unwrap();
        assert_eq!(
            FileSource::new(&path).fetch().unwrap(),
            r#"{"storeList": {}}"#
        );
        fs::remove_file(&path).unwrap();

        assert!(matches!(
            FileSource::new(&path).fetch(),
            Err(FetchError::File { .. })
        ));
    }
}
