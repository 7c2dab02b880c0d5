mod harness;

use harness::config::ConfigBuilder;
use harness::mock_tts::{Behavior, MockTts};
use harness::server::TestServer;

#[tokio::test]
async fn upstream_failure_maps_to_502_and_nothing_is_cached() {
    let data = tempfile::tempdir().unwrap();
    let mock = MockTts::start(Behavior::Fails).await.unwrap();
    let config = ConfigBuilder::new(data.path()).with_streamlabs(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.tts("Hello world", Some("Brian")).await.unwrap();
    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Streamlabs request failed with status 500.");

    let key = murmur_cache::fingerprint("Hello world", "Brian");
    assert!(!data.path().join("cache").join(format!("{key}.mp3")).exists());

    // No cache entry was created, so the retry dispatches again
    let retry = server.tts("Hello world", Some("Brian")).await.unwrap();
    assert_eq!(retry.status(), 502);
    assert_eq!(mock.speak_count(), 2);
}

#[tokio::test]
async fn json_disguised_as_audio_maps_to_502() {
    let data = tempfile::tempdir().unwrap();
    let mock = MockTts::start(Behavior::AudioReturnsJson).await.unwrap();
    let config = ConfigBuilder::new(data.path()).with_streamlabs(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.tts("Hello world", Some("Brian")).await.unwrap();

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Voice not available right now.");

    // The JSON bytes were never cached as audio
    let key = murmur_cache::fingerprint("Hello world", "Brian");
    assert!(!data.path().join("cache").join(format!("{key}.mp3")).exists());
}

#[tokio::test]
async fn google_failure_maps_to_502() {
    let data = tempfile::tempdir().unwrap();
    let mock = MockTts::start(Behavior::Fails).await.unwrap();
    let config = ConfigBuilder::new(data.path())
        .with_streamlabs(&mock.base_url())
        .with_google(&mock.base_url())
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.tts("Hello world", Some("en-GB-Wavenet-B")).await.unwrap();

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Google TTS request failed with status 500.");
}

#[tokio::test]
async fn google_response_without_audio_maps_to_502() {
    let data = tempfile::tempdir().unwrap();
    let mock = MockTts::start(Behavior::NoAudioContent).await.unwrap();
    let config = ConfigBuilder::new(data.path())
        .with_streamlabs(&mock.base_url())
        .with_google(&mock.base_url())
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.tts("Hello world", Some("en-GB-Wavenet-B")).await.unwrap();

    assert_eq!(resp.status(), 502);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Google TTS returned no audio content.");
}

#[tokio::test]
async fn failed_synthesis_does_not_consume_cache_space() {
    let data = tempfile::tempdir().unwrap();
    let mock = MockTts::start(Behavior::Fails).await.unwrap();
    let config = ConfigBuilder::new(data.path()).with_streamlabs(&mock.base_url()).build();
    let server = TestServer::start(config).await.unwrap();

    server.tts("Hello world", Some("Brian")).await.unwrap();

    let manifest_path = data.path().join("cache").join("manifest.json");
    if manifest_path.exists() {
        let manifest: serde_json::Value =
            serde_json::from_slice(&std::fs::read(&manifest_path).unwrap()).unwrap();
        assert_eq!(manifest["total_size"], 0);
    }
}
