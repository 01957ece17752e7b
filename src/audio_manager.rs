use std::{fs::File, io::BufReader, io::Cursor, io::Read, path::Path, sync::Arc};

use rodio::{Decoder, OutputStream, OutputStreamHandle, Sink, Source};

fn load_bytes(path: &Path) -> Option<Vec<u8>> {
    let mut f = File::open(path).ok()?;
    let mut buf = Vec::new();
    f.read_to_end(&mut buf).ok()?;
    Some(buf)
}

/// First file in `dir` among `names` that can be read.
fn load_bytes_any(dir: &Path, names: &[&str]) -> Option<Arc<Vec<u8>>> {
    names.iter().find_map(|n| load_bytes(&dir.join(n))).map(Arc::new)
}

/// Sound effects for the hit-scan. Missing files play nothing.
pub struct AudioManager {
    _stream: OutputStream,
    handle: OutputStreamHandle,
    sfx_sink: Sink,
    shot: Option<Arc<Vec<u8>>>,
    impact: Option<Arc<Vec<u8>>>,
    destroy: Option<Arc<Vec<u8>>>,
    shot_volume: f32,
}

impl AudioManager {
    /// `None` when no output device is available.
    pub fn new() -> Option<Self> {
        let (_stream, handle) = OutputStream::try_default().ok()?;
        let sfx_sink = Sink::try_new(&handle).ok()?;
        Some(Self {
            _stream,
            handle,
            sfx_sink,
            shot: None,
            impact: None,
            destroy: None,
            shot_volume: 0.8,
        })
    }

    pub fn load_sfx_auto(&mut self, dir: &Path) {
        self.shot = load_bytes_any(dir, &["shot.wav", "shoot.wav", "gun.wav", "shot.ogg"]);
        self.impact = load_bytes_any(dir, &["impact.wav", "hit.wav", "wall.wav"]);
        self.destroy = load_bytes_any(dir, &["break.wav", "destroy.wav", "explode.wav"]);
        let found = [&self.shot, &self.impact, &self.destroy].iter().filter(|s| s.is_some()).count();
        tracing::info!("loaded {found}/3 sound effects from {}", dir.display());
    }

    pub fn play_shot(&self) {
        // Own sink so rapid shots overlap instead of queueing
        if let Some(d) = self.shot.clone() {
            if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
                if let Ok(sink) = Sink::try_new(&self.handle) {
                    sink.append(dec.amplify(self.shot_volume.clamp(0.0, 2.5)));
                    sink.detach();
                }
            }
        }
    }

    pub fn play_impact(&self) {
        self.play_data(self.impact.clone());
    }

    pub fn play_break(&self) {
        self.play_data(self.destroy.clone());
    }

    fn play_data(&self, data: Option<Arc<Vec<u8>>>) {
        if let Some(d) = data {
            if let Ok(dec) = Decoder::new(BufReader::new(Cursor::new(d.as_ref().clone()))) {
                self.sfx_sink.append(dec);
            }
        }
    }
}
