use std::path::PathBuf;
use std::sync::mpsc::{self, Sender};
use std::thread;
use std::time::{Duration, Instant};

use narrate_rs::{
    config::{EngineConfig, FootnoteConfig},
    playback::{Narrator, Progress},
    SpeechOptions, SynthesisGateway, UtteranceEvent, UtteranceHandle, VoiceRef,
};

const SAMPLE: &str = "Dr. Smith lives at 1 St. and paid $5 for the 3rd edition[1]. \
However the FBI never asked why. For example nobody checked the receipts!!! \
The story ends here, on the 21st of May.\n\
1. The 3rd edition added an index.";

/// Prints each utterance instead of speaking it and reports it finished at once.
struct ConsoleGateway {
    events: Sender<UtteranceEvent>,
    next_id: u64,
}

impl SynthesisGateway for ConsoleGateway {
    fn is_available(&self) -> bool {
        true
    }

    fn speak(
        &mut self,
        text: &str,
        options: &SpeechOptions,
    ) -> narrate_rs::Result<UtteranceHandle> {
        self.next_id += 1;
        let handle = UtteranceHandle(self.next_id);
        println!("[{:>3}] (rate {:.1}) {text}", self.next_id, options.rate);

        for event in [UtteranceEvent::started(handle), UtteranceEvent::ended(handle)] {
            self.events
                .send(event)
                .map_err(|e| narrate_rs::SpeechError::Gateway(e.to_string()))?;
        }
        Ok(handle)
    }

    fn pause(&mut self) {}

    fn resume(&mut self) {}

    fn cancel_all(&mut self) {}

    fn list_voices(&self) -> Vec<VoiceRef> {
        vec![VoiceRef {
            id: "console".to_string(),
            name: "Console".to_string(),
            lang: "en-US".to_string(),
            default: true,
        }]
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let text = match args.next() {
        Some(path) => std::fs::read_to_string(PathBuf::from(path))?,
        None => SAMPLE.to_string(),
    };
    let config = match args.next() {
        Some(path) => EngineConfig::load(&PathBuf::from(path))?,
        None => EngineConfig {
            footnotes: FootnoteConfig {
                read_aloud: true,
                ..Default::default()
            },
            ..Default::default()
        },
    };

    let (tx, rx) = mpsc::channel();
    let gateway = ConsoleGateway {
        events: tx,
        next_id: 0,
    };
    let mut narrator = Narrator::new(gateway, config);

    if let Some(voice) = narrator.voice_named("en") {
        println!("Using voice {} ({})", voice.name, voice.lang);
    }

    let start = Instant::now();
    let session = narrator.convert(&text, None)?;
    println!(
        "Session {}: {} chunks, {} footnotes read inline",
        session.id, session.chunk_count, session.footnote_count
    );

    while let Ok(event) = rx.recv_timeout(Duration::from_secs(1)) {
        match narrator.handle_event(event)? {
            Progress::Settling { delay } => {
                let position = narrator.position();
                println!("      {}% read, {} left", position.percentage, position.remaining);
                thread::sleep(delay);
                narrator.continue_after_settle()?;
            }
            Progress::Finished => break,
            _ => {}
        }
    }

    println!("Read {} chunks in {:.2?}", session.chunk_count, start.elapsed());
    narrator.stop();
    Ok(())
}
