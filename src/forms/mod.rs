use thiserror::Error;

use crate::client::{CreateCompanyRequest, DocumentInput};
use crate::model::PolicyKind;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InputMode {
    #[default]
    Text,
    Url,
    AutoFetch,
}

impl InputMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "text" | "paste" => Some(Self::Text),
            "url" | "link" => Some(Self::Url),
            "auto" | "auto-fetch" | "autofetch" => Some(Self::AutoFetch),
            _ => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter a company name.")]
    MissingName,

    #[error("Please enter a category.")]
    MissingCategory,

    #[error("Please paste the {label} text.")]
    MissingText { label: &'static str },

    #[error("Please enter the {label} URL.")]
    MissingUrl { label: &'static str },

    #[error("Auto-fetch is not available for the {label}.")]
    AutoFetchUnsupported { label: &'static str },

    #[error("The {label} cannot be uploaded separately.")]
    UploadUnsupported { label: &'static str },

    #[error("This company has no {label} to analyze.")]
    NoDocument { label: &'static str },
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentField {
    pub mode: InputMode,
    pub text: String,
    pub url: String,
}

impl DocumentField {
    pub fn text(text: &str) -> Self {
        Self {
            mode: InputMode::Text,
            text: text.to_string(),
            url: String::new(),
        }
    }

    pub fn url(url: &str) -> Self {
        Self {
            mode: InputMode::Url,
            text: String::new(),
            url: url.to_string(),
        }
    }

    pub fn auto_fetch() -> Self {
        Self {
            mode: InputMode::AutoFetch,
            ..Default::default()
        }
    }

    pub fn to_input(&self, kind: PolicyKind) -> Result<DocumentInput, FormError> {
        match self.mode {
            InputMode::Text => {
                let text = self.text.trim();
                if text.is_empty() {
                    return Err(FormError::MissingText { label: kind.label() });
                }
                Ok(DocumentInput::Text(text.to_string()))
            }
            InputMode::Url => {
                let url = self.url.trim();
                if url.is_empty() {
                    return Err(FormError::MissingUrl { label: kind.label() });
                }
                Ok(DocumentInput::Url(url.to_string()))
            }
            InputMode::AutoFetch => Ok(DocumentInput::AutoFetch),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AddCompanyForm {
    pub name: String,
    pub category: String,
    pub terms: DocumentField,
    pub cookie: Option<DocumentField>,
    pub privacy: Option<DocumentField>,
}

impl AddCompanyForm {
    pub fn build_request(&self) -> Result<CreateCompanyRequest, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingName);
        }
        let category = self.category.trim();
        if category.is_empty() {
            return Err(FormError::MissingCategory);
        }

        let mut request = CreateCompanyRequest::new(name, category)
            .with_document(PolicyKind::Terms, &self.terms.to_input(PolicyKind::Terms)?);

        for (kind, field) in [
            (PolicyKind::Cookie, self.cookie.as_ref()),
            (PolicyKind::Privacy, self.privacy.as_ref()),
        ] {
            let Some(field) = field else {
                continue;
            };
            if field.mode == InputMode::AutoFetch {
                return Err(FormError::AutoFetchUnsupported { label: kind.label() });
            }
            request = request.with_document(kind, &field.to_input(kind)?);
        }
        Ok(request)
    }
}

pub fn build_upload(kind: PolicyKind, field: &DocumentField) -> Result<DocumentInput, FormError> {
    if kind.upload_segment().is_none() {
        return Err(FormError::UploadUnsupported { label: kind.label() });
    }
    if field.mode == InputMode::AutoFetch {
        return Err(FormError::AutoFetchUnsupported { label: kind.label() });
    }
    field.to_input(kind)
}
