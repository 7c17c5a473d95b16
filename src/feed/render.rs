//! Output document rendering.

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::config::OutputConfig;
use crate::youtube::VideoItem;
use crate::{Result, TubefeedError};

const ATOM_NS: &str = "http://www.w3.org/2005/Atom";
const YT_NS: &str = "http://www.youtube.com/xml/schemas/2015";
const MEDIA_NS: &str = "http://search.yahoo.com/mrss/";

const WATCH_URL: &str = "https://www.youtube.com/watch?v=";
const CHANNEL_URL: &str = "https://www.youtube.com/channel/";
const EMBED_URL: &str = "https://www.youtube.com/v/";

/// Turns the videos of the feed window into an output document.
pub trait FeedRenderer: Send + Sync {
    /// MIME type of the rendered document.
    fn content_type(&self) -> &'static str;

    /// Render `videos` in the given order.
    fn render(&self, videos: &[VideoItem]) -> Result<Vec<u8>>;
}

/// Atom renderer in the layout of the platform's own channel feeds.
#[derive(Debug, Clone)]
pub struct AtomRenderer {
    title: String,
    author: String,
    self_link: String,
    alternate_link: String,
}

impl AtomRenderer {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            title: config.title.clone(),
            author: config.author.clone(),
            self_link: config.self_link.clone(),
            alternate_link: config.alternate_link.clone(),
        }
    }
}

type XmlWriter = Writer<Vec<u8>>;

fn emit(writer: &mut XmlWriter, event: Event<'_>) -> Result<()> {
    writer
        .write_event(event)
        .map_err(|e| TubefeedError::Render(e.to_string()))
}

fn start(writer: &mut XmlWriter, name: &str) -> Result<()> {
    emit(writer, Event::Start(BytesStart::new(name)))
}

fn end(writer: &mut XmlWriter, name: &str) -> Result<()> {
    emit(writer, Event::End(BytesEnd::new(name)))
}

fn text_element(writer: &mut XmlWriter, name: &str, text: &str) -> Result<()> {
    start(writer, name)?;
    emit(writer, Event::Text(BytesText::new(text)))?;
    end(writer, name)
}

fn empty_element(writer: &mut XmlWriter, name: &str, attributes: &[(&str, &str)]) -> Result<()> {
    let element = BytesStart::new(name).with_attributes(attributes.iter().copied());
    emit(writer, Event::Empty(element))
}

fn timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

impl AtomRenderer {
    fn write_entry(&self, writer: &mut XmlWriter, video: &VideoItem) -> Result<()> {
        let snippet = &video.snippet;
        let channel_uri = format!("{CHANNEL_URL}{}", snippet.channel_id);
        let watch_url = format!("{WATCH_URL}{}", video.id);
        let embed_url = format!("{EMBED_URL}{}?version=3", video.id);
        let published = timestamp(snippet.published_at);

        start(writer, "entry")?;
        text_element(writer, "id", &format!("yt:video:{}", video.id))?;
        text_element(writer, "yt:videoId", &video.id)?;
        text_element(writer, "yt:channelId", &snippet.channel_id)?;
        text_element(writer, "title", &snippet.title)?;
        empty_element(writer, "link", &[("rel", "alternate"), ("href", watch_url.as_str())])?;

        start(writer, "author")?;
        text_element(writer, "name", &snippet.channel_title)?;
        text_element(writer, "uri", &channel_uri)?;
        end(writer, "author")?;

        text_element(writer, "published", &published)?;
        text_element(writer, "updated", &published)?;

        if let Some(player) = &video.player {
            let content = BytesStart::new("content").with_attributes([("type", "html")]);
            emit(writer, Event::Start(content))?;
            emit(writer, Event::Text(BytesText::new(&player.embed_html)))?;
            end(writer, "content")?;
        }

        let thumbnail = &snippet.thumbnails.high;
        let thumb_width = thumbnail.width.unwrap_or(480).to_string();
        let thumb_height = thumbnail.height.unwrap_or(360).to_string();

        start(writer, "media:group")?;
        text_element(writer, "media:title", &snippet.title)?;
        empty_element(
            writer,
            "media:content",
            &[
                ("url", embed_url.as_str()),
                ("type", "application/x-shockwave-flash"),
                ("width", "640"),
                ("height", "390"),
            ],
        )?;
        empty_element(
            writer,
            "media:thumbnail",
            &[
                ("url", thumbnail.url.as_str()),
                ("width", thumb_width.as_str()),
                ("height", thumb_height.as_str()),
            ],
        )?;
        text_element(writer, "media:description", &snippet.description)?;
        end(writer, "media:group")?;

        end(writer, "entry")
    }
}

impl FeedRenderer for AtomRenderer {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn render(&self, videos: &[VideoItem]) -> Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);
        emit(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;

        let feed = BytesStart::new("feed").with_attributes([
            ("xmlns", ATOM_NS),
            ("xmlns:yt", YT_NS),
            ("xmlns:media", MEDIA_NS),
        ]);
        emit(&mut writer, Event::Start(feed))?;

        let updated = videos
            .iter()
            .map(VideoItem::published_at)
            .max()
            .unwrap_or_else(Utc::now);

        empty_element(
            &mut writer,
            "link",
            &[("rel", "self"), ("href", self.self_link.as_str())],
        )?;
        empty_element(
            &mut writer,
            "link",
            &[("rel", "alternate"), ("href", self.alternate_link.as_str())],
        )?;
        text_element(&mut writer, "id", &self.self_link)?;
        text_element(&mut writer, "title", &self.title)?;
        start(&mut writer, "author")?;
        text_element(&mut writer, "name", &self.author)?;
        end(&mut writer, "author")?;
        text_element(&mut writer, "updated", &timestamp(updated))?;

        for video in videos {
            self.write_entry(&mut writer, video)?;
        }

        end(&mut writer, "feed")?;
        Ok(writer.into_inner())
    }
}
