pub mod history_repository;
pub mod openai_speech_repository;
pub mod speech_repository;

pub use history_repository::HistoryRepository;
pub use openai_speech_repository::OpenAiSpeechRepository;
pub use speech_repository::SpeechRepository;
