//! Multipart upload parts

use std::{fmt, path::Path};

use reqwest::multipart::{Form, Part};
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::error::Result;

/// A file attached to a multipart form
///
/// The body is read exactly once, when the form is built.
pub struct UploadFile {
    pub field_name: String,
    pub file_name: String,
    pub body: Box<dyn AsyncRead + Send + Unpin>,
}

impl UploadFile {
    /// Attach any async reader
    pub fn new(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        body: impl AsyncRead + Send + Unpin + 'static,
    ) -> Self {
        Self {
            field_name: field_name.into(),
            file_name: file_name.into(),
            body: Box::new(body),
        }
    }

    /// Attach in-memory content
    pub fn from_bytes(
        field_name: impl Into<String>,
        file_name: impl Into<String>,
        content: impl Into<Vec<u8>>,
    ) -> Self {
        Self::new(field_name, file_name, std::io::Cursor::new(content.into()))
    }

    /// Attach a file from disk, named after the last path component
    pub async fn open(field_name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = tokio::fs::File::open(path).await?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self::new(field_name, file_name, file))
    }

    async fn into_part(mut self) -> Result<(String, Part)> {
        let mut content = Vec::new();
        self.body.read_to_end(&mut content).await?;
        let part = Part::bytes(content)
            .file_name(self.file_name)
            .mime_str("application/octet-stream")?;
        Ok((self.field_name, part))
    }
}

impl fmt::Debug for UploadFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadFile")
            .field("field_name", &self.field_name)
            .field("file_name", &self.file_name)
            .finish_non_exhaustive()
    }
}

/// Build a multipart form: text fields first, then files, each in the given order
pub(crate) async fn build_form<I, K, V>(fields: I, files: Vec<UploadFile>) -> Result<Form>
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<String>,
{
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name.into(), value.into());
    }
    for file in files {
        let (name, part) = file.into_part().await?;
        form = form.part(name, part);
    }
    Ok(form)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn test_open_uses_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.csv");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"a,b\n1,2\n")
            .unwrap();

        let upload = UploadFile::open("attachment", &path).await.unwrap();
        assert_eq!(upload.field_name, "attachment");
        assert_eq!(upload.file_name, "report.csv");

        let (name, _part) = upload.into_part().await.unwrap();
        assert_eq!(name, "attachment");
    }

    #[tokio::test]
    async fn test_open_missing_file_fails() {
        let result = UploadFile::open("f", "/nonexistent/file.bin").await;
        assert!(matches!(result, Err(crate::HttpError::Io(_))));
    }

    #[tokio::test]
    async fn test_build_form_has_boundary() {
        let form = build_form(
            [("foo", "bar")],
            vec![UploadFile::from_bytes("file", "test.txt", "hello world")],
        )
        .await
        .unwrap();
        assert!(!form.boundary().is_empty());
    }

    #[test]
    fn test_debug_omits_body() {
        let upload = UploadFile::from_bytes("file", "a.txt", "secret");
        let debug = format!("{upload:?}");
        assert!(debug.contains("a.txt"));
        assert!(!debug.contains("secret"));
    }
}
