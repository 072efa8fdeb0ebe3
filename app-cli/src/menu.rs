//! Interactive menu loop
//!
//! Reads commands line by line while the active song keeps playing. Lyric
//! lines arrive over a channel and are written by the same loop, so they
//! never interleave with status output.

use core_library::Playlist;
use core_playback::LyricLine;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, Lines};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{debug, info, warn};

const MENU: &str = "\n--------MENU--------\n\n\
1. Play a song\n\
2. Display playlist\n\
3. Next\n\
4. Previous\n\
5. Restart\n\
6. Exit";

#[derive(Debug, Clone, Copy)]
enum Command {
    Play(usize),
    Next,
    Previous,
    Restart,
}

pub struct Menu<R, W> {
    playlist: Playlist,
    lyrics: UnboundedReceiver<LyricLine>,
    input: Lines<R>,
    out: W,
}

impl<R, W> Menu<R, W>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    pub fn new(
        playlist: Playlist,
        lyrics: UnboundedReceiver<LyricLine>,
        input: R,
        out: W,
    ) -> Self {
        Self {
            playlist,
            lyrics,
            input: input.lines(),
            out,
        }
    }

    /// Run until the user exits or input ends, then stop the active song.
    pub async fn run(mut self) -> io::Result<()> {
        loop {
            writeln!(self.out, "{MENU}")?;
            self.prompt("\nEnter your choice: ")?;

            let Some(choice) = self.read_line().await? else {
                debug!("Input closed");
                break;
            };

            match choice.trim() {
                "1" => {
                    if !self.play_numbered().await? {
                        break;
                    }
                }
                "2" => self.display_playlist()?,
                "3" => self.execute(Command::Next).await?,
                "4" => self.execute(Command::Previous).await?,
                "5" => self.execute(Command::Restart).await?,
                "6" => {
                    writeln!(self.out, "Exiting...")?;
                    break;
                }
                other => {
                    debug!(choice = other, "Unrecognised menu choice");
                    writeln!(self.out, "Invalid choice. Please enter a number from 1 to 6.")?;
                }
            }
        }

        if let Some(outcome) = self.playlist.stop().await {
            info!(?outcome, "Stopped active song on exit");
        }
        self.flush_lyrics()?;
        self.out.flush()
    }

    /// Returns `false` if input ended before a number was entered.
    async fn play_numbered(&mut self) -> io::Result<bool> {
        writeln!(self.out, "Playlist:")?;
        for (number, title) in self.playlist.list_numbered() {
            writeln!(self.out, "{number}. {title}")?;
        }
        self.prompt("\nEnter the number of the song you want to play: ")?;

        let Some(line) = self.read_line().await? else {
            return Ok(false);
        };

        match line.trim().parse::<usize>() {
            Ok(number) => self.execute(Command::Play(number)).await?,
            Err(_) => writeln!(self.out, "Invalid song number.")?,
        }
        Ok(true)
    }

    fn display_playlist(&mut self) -> io::Result<()> {
        writeln!(self.out, "Playlist:")?;
        for title in self.playlist.list() {
            writeln!(self.out, "- {title}")?;
        }
        Ok(())
    }

    async fn execute(&mut self, command: Command) -> io::Result<()> {
        // Lines already due belong ahead of this command's status.
        self.flush_lyrics()?;

        let result = match command {
            Command::Play(number) => self.playlist.play_by_index(number).await,
            Command::Next => self.playlist.next().await,
            Command::Previous => self.playlist.previous().await,
            Command::Restart => self.playlist.restart().await,
        }
        .map(|song| song.title().to_string());

        match result {
            Ok(title) => writeln!(self.out, "Playing song: {title}"),
            Err(e) if e.is_navigation() => {
                debug!(?command, error = %e, "Navigation refused");
                writeln!(self.out, "{e}")
            }
            Err(e) => {
                // The cursor already points at the song whose audio failed.
                if let Some(song) = self.playlist.current() {
                    writeln!(self.out, "Playing song: {}", song.title())?;
                }
                warn!(?command, error = %e, "Playback failed");
                writeln!(self.out, "{e}")
            }
        }
    }

    /// Wait for the next input line, printing lyrics and reaping the
    /// finished song in the meantime.
    async fn read_line(&mut self) -> io::Result<Option<String>> {
        loop {
            let playing = self.playlist.is_playing();

            tokio::select! {
                line = self.input.next_line() => return line,
                Some(line) = self.lyrics.recv() => self.write_lyric(&line)?,
                outcome = self.playlist.wait_until_finished(), if playing => {
                    debug!(?outcome, "Song finished");
                }
            }
        }
    }

    fn flush_lyrics(&mut self) -> io::Result<()> {
        while let Ok(line) = self.lyrics.try_recv() {
            self.write_lyric(&line)?;
        }
        Ok(())
    }

    fn write_lyric(&mut self, line: &LyricLine) -> io::Result<()> {
        writeln!(self.out, "{}", line.text)?;
        self.out.flush()
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.out, "{text}")?;
        self.out.flush()
    }
}
