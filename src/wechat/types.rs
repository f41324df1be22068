use serde::{Deserialize, Serialize};

/// Response of the vendor token grant endpoint.
///
/// Success carries `access_token`/`expires_in`; failure carries
/// `errcode`/`errmsg`. Both shapes arrive on HTTP 200.
#[derive(Debug, Deserialize)]
pub struct TokenGrant {
    pub access_token: Option<String>,
    pub expires_in: Option<u64>,
    #[serde(default)]
    pub errcode: i64,
    pub errmsg: Option<String>,
}

/// Response of `/cgi-bin/media/upload`.
#[derive(Debug, Deserialize)]
pub struct MediaUploadAck {
    pub media_id: Option<String>,
    pub url: Option<String>,
    #[serde(default)]
    pub errcode: i64,
    pub errmsg: Option<String>,
}

/// A vendor-accepted media asset.
#[derive(Debug, Clone, Serialize)]
pub struct MediaUpload {
    pub media_id: String,
    pub url: Option<String>,
}

/// Response of `/cgi-bin/draft/add` and `/cgi-bin/freepublish/submit`.
///
/// `errcode` defaults to 0: real draft-creation success bodies omit it
/// entirely and carry only `media_id`.
#[derive(Debug, Deserialize)]
pub struct PublishAck {
    #[serde(default)]
    pub errcode: i64,
    pub errmsg: Option<String>,
    pub media_id: Option<String>,
    pub publish_id: Option<IdValue>,
}

/// Vendor identifiers appear as JSON strings in some responses and as
/// numbers in others.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum IdValue {
    Text(String),
    Number(i64),
}

impl From<IdValue> for String {
    fn from(id: IdValue) -> Self {
        match id {
            IdValue::Text(s) => s,
            IdValue::Number(n) => n.to_string(),
        }
    }
}

/// How the caller wants an article handled by the vendor platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublishMode {
    /// Park the article as a vendor-side draft.
    #[default]
    Draft,
    /// Submit for immediate publication.
    Publish,
    /// Park as a draft for later manual publication. The vendor draft API
    /// has no deferred-publish call, so this never applies a schedule time.
    Schedule,
}

impl PublishMode {
    pub fn endpoint(self) -> &'static str {
        match self {
            PublishMode::Publish => "/cgi-bin/freepublish/submit",
            PublishMode::Draft | PublishMode::Schedule => "/cgi-bin/draft/add",
        }
    }
}

/// A single article in the shape the vendor content API expects.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub author: String,
    pub digest: String,
    pub content: String,
    pub content_source_url: String,
    pub thumb_media_id: String,
    pub show_cover_pic: u8,
    pub need_open_comment: u8,
    pub only_fans_can_comment: u8,
}

impl Article {
    /// An article with the vendor defaults: no author, no digest, no cover,
    /// comments open to everyone.
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: String::new(),
            digest: String::new(),
            content: content.into(),
            content_source_url: String::new(),
            thumb_media_id: String::new(),
            show_cover_pic: 0,
            need_open_comment: 1,
            only_fans_can_comment: 0,
        }
    }

    pub fn with_author(mut self, author: impl Into<String>) -> Self {
        self.author = author.into();
        self
    }

    pub fn with_digest(mut self, digest: impl Into<String>) -> Self {
        self.digest = digest.into();
        self
    }

    /// Attaching a cover also raises the vendor's show-cover flag.
    pub fn with_cover(mut self, media_id: impl Into<String>) -> Self {
        self.thumb_media_id = media_id.into();
        self.show_cover_pic = 1;
        self
    }
}

/// Wire envelope for article submission: `{"articles": [ ... ]}`.
#[derive(Debug, Serialize)]
pub struct ArticlePayload<'a> {
    pub articles: [&'a Article; 1],
}

/// Outcome of a successful article submission.
#[derive(Debug, Clone, Serialize)]
pub struct PublishReceipt {
    pub status: String,
    pub media_id: Option<String>,
    pub publish_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_mode_selects_endpoint() {
        assert_eq!(PublishMode::Draft.endpoint(), "/cgi-bin/draft/add");
        assert_eq!(
            PublishMode::Publish.endpoint(),
            "/cgi-bin/freepublish/submit"
        );
        // schedule falls back to draft creation
        assert_eq!(PublishMode::Schedule.endpoint(), "/cgi-bin/draft/add");
    }

    #[test]
    fn publish_mode_parses_lowercase() {
        let mode: PublishMode = serde_json::from_str("\"publish\"").unwrap();
        assert_eq!(mode, PublishMode::Publish);
        let mode: PublishMode = serde_json::from_str("\"schedule\"").unwrap();
        assert_eq!(mode, PublishMode::Schedule);
    }

    #[test]
    fn article_defaults_to_empty_optionals() {
        let article = Article::new("T", "C");
        let json = serde_json::to_value(&article).unwrap();
        assert_eq!(json["author"], "");
        assert_eq!(json["digest"], "");
        assert_eq!(json["thumb_media_id"], "");
        assert_eq!(json["show_cover_pic"], 0);
        assert_eq!(json["need_open_comment"], 1);
        assert_eq!(json["only_fans_can_comment"], 0);
    }

    #[test]
    fn cover_raises_show_cover_flag() {
        let article = Article::new("T", "C").with_cover("MEDIA_1");
        assert_eq!(article.thumb_media_id, "MEDIA_1");
        assert_eq!(article.show_cover_pic, 1);
    }

    #[test]
    fn payload_wraps_single_article() {
        let article = Article::new("T", "C");
        let payload = ArticlePayload {
            articles: [&article],
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["articles"].as_array().unwrap().len(), 1);
        assert_eq!(json["articles"][0]["title"], "T");
    }

    #[test]
    fn publish_id_accepts_string_and_number() {
        let ack: PublishAck =
            serde_json::from_str(r#"{"errcode":0,"publish_id":"42"}"#).unwrap();
        assert_eq!(ack.publish_id.map(String::from), Some("42".to_string()));

        let ack: PublishAck =
            serde_json::from_str(r#"{"errcode":0,"publish_id":2247483647}"#).unwrap();
        assert_eq!(
            ack.publish_id.map(String::from),
            Some("2247483647".to_string())
        );
    }

    #[test]
    fn errcode_defaults_to_success_when_absent() {
        // live draft/add success bodies carry only media_id
        let ack: PublishAck = serde_json::from_str(r#"{"media_id":"M1"}"#).unwrap();
        assert_eq!(ack.errcode, 0);
        assert_eq!(ack.media_id.as_deref(), Some("M1"));
    }
}
