use std::time::Duration;

use tokio::{
    io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt},
    select,
    time::{interval, MissedTickBehavior},
};
use tracing::{info, instrument, trace};

use crate::screen::{Alert, Flow, Screen};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickIntervals {
    /// Clock display and countdown refresh
    pub clock: Duration,
    /// Day rollover check for the glass counter
    pub rollover: Duration,
}

impl Default for TickIntervals {
    fn default() -> Self {
        Self {
            clock: Duration::from_secs(1),
            rollover: Duration::from_secs(60),
        }
    }
}

async fn write_alerts<W>(output: &mut W, alerts: &[Alert]) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    for alert in alerts {
        output.write_all(format!("{alert}\n").as_bytes()).await?;
    }
    output.flush().await
}

/// Drives `screen` until the user quits or `input` closes.
///
/// User lines and both ticks are handled one at a time, so the screen never
/// sees two events at once. Dropping the future stops both ticks.
#[instrument(skip_all)]
pub async fn run_screen<R, W>(
    screen: &mut Screen,
    input: R,
    mut output: W,
    ticks: TickIntervals,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    let mut clock_tick = interval(ticks.clock);
    clock_tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut rollover_tick = interval(ticks.rollover);
    rollover_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    info!("Input closed, shutting down");
                    break;
                };

                match screen.handle_line(&line) {
                    Flow::Continue(alerts) => write_alerts(&mut output, &alerts).await?,
                    Flow::Quit => {
                        info!("Quit requested");
                        break;
                    }
                }
            },
            _ = clock_tick.tick() => {
                if let Some(title) = screen.tick() {
                    output.write_all(format!("\x1b]0;{title}\x07").as_bytes()).await?;
                    output.flush().await?;
                }
            },
            _ = rollover_tick.tick() => {
                trace!("Checking for day rollover");
                if let Some(alert) = screen.check_rollover() {
                    write_alerts(&mut output, &[alert]).await?;
                }
            },
        }
    }

    Ok(())
}
