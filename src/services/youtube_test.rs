use super::*;

const ID: &str = "dQw4w9WgXcQ";

#[test]
fn watch_urls() {
    for url in [
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ",
        "http://youtube.com/watch?v=dQw4w9WgXcQ",
        "www.youtube.com/watch?v=dQw4w9WgXcQ",
        "https://m.youtube.com/watch?feature=share&v=dQw4w9WgXcQ",
        "https://www.youtube.com/watch?v=dQw4w9WgXcQ&t=42s",
        "https://WWW.YouTube.com/watch?v=dQw4w9WgXcQ#komentar",
    ] {
        assert_eq!(youtube_video_id(url).as_deref(), Some(ID), "{url}");
    }
}

#[test]
fn path_style_urls() {
    for url in [
        "https://youtu.be/dQw4w9WgXcQ",
        "youtu.be/dQw4w9WgXcQ?si=abc",
        "https://www.youtube.com/embed/dQw4w9WgXcQ",
        "https://youtube.com/shorts/dQw4w9WgXcQ",
        "https://www.youtube.com/live/dQw4w9WgXcQ?feature=share",
        "  https://youtu.be/dQw4w9WgXcQ  ",
    ] {
        assert_eq!(youtube_video_id(url).as_deref(), Some(ID), "{url}");
    }
}

#[test]
fn rejects_non_youtube_and_malformed() {
    for url in [
        "",
        "https://vimeo.com/12345678901",
        "https://www.youtube.com/",
        "https://www.youtube.com/watch?list=PL123",
        "https://www.youtube.com/watch?v=short",
        "https://youtu.be/dQw4w9WgXcQextra",
        "https://www.youtube.com/channel/dQw4w9WgXcQ",
        "https://youtu.be/dQw4w9WgXc!",
        "https://notyoutube.com/watch?v=dQw4w9WgXcQ",
    ] {
        assert_eq!(youtube_video_id(url), None, "{url}");
    }
}

#[test]
fn embed_url_is_canonical() {
    assert_eq!(
        youtube_embed_url("https://youtu.be/dQw4w9WgXcQ").as_deref(),
        Some("https://www.youtube.com/embed/dQw4w9WgXcQ")
    );
    assert_eq!(youtube_embed_url("bukan url"), None);
}
