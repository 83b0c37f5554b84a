use crate::models::LedgerResponse;

pub fn render_index(ledger: &LedgerResponse) -> String {
    let available = ledger.summary.map_or(0, |s| s.available_steps);
    INDEX_HTML
        .replace("{{DATE}}", &ledger.date)
        .replace("{{TREATS}}", &ledger.total_treats.to_string())
        .replace("{{AVAILABLE}}", &available.to_string())
        .replace("{{STEPS_PER_TREAT}}", &ledger.steps_per_treat.to_string())
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Pet Companion</title>
  <style>
    :root {
      --bg: #1d2330;
      --card: #283044;
      --ink: #f3f1ea;
      --muted: #a7adbd;
      --accent: #ffb347;
      --ok: #4caf50;
      --err: #f44336;
      --info: #2196f3;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 24px 16px 48px;
    }

    .app {
      width: min(720px, 100%);
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 18px;
      padding: 22px;
      display: grid;
      gap: 12px;
    }

    h1 {
      margin: 0;
      font-size: 1.9rem;
    }

    h2 {
      margin: 0;
      font-size: 1.1rem;
      color: var(--muted);
      font-weight: 500;
    }

    .row {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    .big {
      font-size: 2rem;
      font-weight: 600;
    }

    button {
      border: none;
      border-radius: 12px;
      padding: 10px 16px;
      font: inherit;
      cursor: pointer;
      background: #3a4560;
      color: var(--ink);
    }

    button.primary {
      background: var(--accent);
      color: #2b2a28;
    }

    button:disabled {
      opacity: 0.45;
      cursor: progress;
    }

    input {
      flex: 1;
      min-width: 200px;
      border-radius: 10px;
      border: 1px solid #48526c;
      padding: 9px 12px;
      background: #1f2636;
      color: var(--ink);
    }

    .emotions {
      display: grid;
      grid-template-columns: repeat(5, 1fr);
      gap: 8px;
    }

    .toast {
      position: fixed;
      top: 20px;
      right: 20px;
      padding: 12px 20px;
      border-radius: 8px;
      font-weight: 600;
      opacity: 0;
      transition: opacity 0.3s ease;
    }

    .toast.show {
      opacity: 1;
    }

    .toast.success { background: var(--ok); }
    .toast.error { background: var(--err); }
    .toast.info { background: var(--info); }

    .hint {
      color: var(--muted);
      font-size: 0.85rem;
    }
  </style>
</head>
<body>
  <main class="app">
    <header>
      <h1>Pet Companion</h1>
      <p class="hint">{{DATE}} &middot; {{STEPS_PER_TREAT}} steps per treat</p>
    </header>

    <section class="card">
      <h2>Steps</h2>
      <div class="row">
        <input id="token" type="password" placeholder="Fitness access token" />
        <button id="token-btn">Connect</button>
      </div>
      <div class="row">
        <span>Steps today:</span>
        <span class="big" id="total-steps">&ndash;</span>
        <button id="refresh-btn">Refresh</button>
      </div>
      <div class="row">
        <span id="available">{{AVAILABLE}} steps available to convert</span>
        <button id="convert-btn" class="primary" hidden>Convert to treats</button>
      </div>
    </section>

    <section class="card">
      <h2>Treats</h2>
      <div class="row">
        <span class="big" id="treats">{{TREATS}}</span>
        <button id="feed-btn" class="primary">Feed</button>
        <span class="hint" id="hunger">hunger: unknown</span>
      </div>
    </section>

    <section class="card">
      <h2>Expression</h2>
      <div class="emotions">
        <button data-state="0">Neutral</button>
        <button data-state="1">Angry</button>
        <button data-state="2">Surprised</button>
        <button data-state="3">Sad</button>
        <button data-state="4">Suspicious</button>
        <button data-state="5">Left</button>
        <button data-state="6">Right</button>
        <button data-state="7">Up</button>
        <button data-state="8">Down</button>
        <button data-state="9">Sleepy</button>
      </div>
      <div class="row">
        <button id="light-btn">Reading light</button>
        <button id="manual-btn">Manual mode</button>
      </div>
      <p class="hint">Keys: 0-9 expressions, L light, M manual/auto</p>
    </section>
  </main>

  <div class="toast" id="toast"></div>

  <script>
    const $ = (id) => document.getElementById(id);
    let toastTimer;

    const notify = (message, type = 'info') => {
      const toast = $('toast');
      toast.textContent = message;
      toast.className = `toast ${type} show`;
      clearTimeout(toastTimer);
      toastTimer = setTimeout(() => toast.classList.remove('show'), 3000);
    };

    const call = async (path, options = {}) => {
      const res = await fetch(path, { method: 'POST', ...options });
      if (!res.ok) {
        const msg = await res.text();
        throw new Error(msg || `Request failed (${res.status})`);
      }
      return res.status === 204 ? null : res.json();
    };

    // Disables the control until the request settles so actions never overlap.
    const guarded = (button, action) => async () => {
      if (button.disabled) return;
      button.disabled = true;
      try {
        await action();
      } catch (err) {
        notify(err.message, 'error');
      } finally {
        button.disabled = false;
      }
    };

    const showTreats = (total) => {
      $('treats').textContent = total;
    };

    const showAvailable = (steps, treats) => {
      $('available').textContent = `${steps.toLocaleString()} steps available to convert`;
      $('convert-btn').hidden = treats === 0;
    };

    $('token-btn').addEventListener('click', guarded($('token-btn'), async () => {
      await call('/api/fitness/token', {
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ access_token: $('token').value })
      });
      $('token').value = '';
      notify('Fitness account connected', 'success');
      await refresh();
    }));

    const refresh = async () => {
      const data = await call('/api/steps/refresh');
      $('total-steps').textContent = data.total_steps.toLocaleString();
      showAvailable(data.available_steps, data.available_treats);
      showTreats(data.total_treats);
    };

    $('refresh-btn').addEventListener('click', guarded($('refresh-btn'), refresh));

    $('convert-btn').addEventListener('click', guarded($('convert-btn'), async () => {
      const data = await call('/api/steps/convert');
      showAvailable(data.available_steps, 0);
      showTreats(data.total_treats);
      if (data.converted) {
        const n = data.converted.treats_minted;
        notify(`${n} treat${n !== 1 ? 's' : ''} bought!`, 'success');
      }
    }));

    $('feed-btn').addEventListener('click', guarded($('feed-btn'), async () => {
      const data = await call('/api/feed');
      showTreats(data.total_treats);
      notify(data.message, 'success');
    }));

    const sendEmotion = async (state) => {
      await call('/api/emotion', {
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ state })
      });
      notify(`Emotion changed to state ${state}`, 'success');
    };

    document.querySelectorAll('[data-state]').forEach((button) => {
      button.addEventListener('click', guarded(button, () => sendEmotion(Number(button.dataset.state))));
    });

    const toggleLight = guarded($('light-btn'), async () => {
      const data = await call('/api/light');
      $('light-btn').textContent = data.state === 'on' ? 'Light OFF' : 'Reading light';
      notify(data.message, 'success');
    });

    const toggleManual = guarded($('manual-btn'), async () => {
      const data = await call('/api/manual');
      $('manual-btn').textContent = data.state === 'manual' ? 'Auto mode' : 'Manual mode';
      notify(data.message, 'info');
    });

    $('light-btn').addEventListener('click', toggleLight);
    $('manual-btn').addEventListener('click', toggleManual);

    document.addEventListener('keydown', (event) => {
      if (event.target.tagName === 'INPUT') return;
      if (/^[0-9]$/.test(event.key)) {
        const button = document.querySelector(`[data-state="${event.key}"]`);
        guarded(button, () => sendEmotion(Number(event.key)))();
      } else if (event.key === 'l' || event.key === 'L') {
        toggleLight();
      } else if (event.key === 'm' || event.key === 'M') {
        toggleManual();
      }
    });

    const pollHunger = async () => {
      const res = await fetch('/api/hunger');
      if (!res.ok) return;
      const report = await res.json();
      if (report) {
        $('hunger').textContent = `hunger: ${report.hunger}%${report.critical ? ' (starving)' : ''}`;
      }
    };

    pollHunger();
    setInterval(() => pollHunger().catch(() => {}), 5000);
  </script>
</body>
</html>
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StepSummary;

    #[test]
    fn index_shows_ledger_values() {
        let html = render_index(&LedgerResponse {
            date: "2026-10-19".to_string(),
            converted_steps: 300,
            total_treats: 4,
            last_update_date: None,
            steps_per_treat: 100,
            summary: Some(StepSummary {
                total_steps: 350,
                available_steps: 50,
                available_treats: 0,
            }),
        });
        assert!(html.contains("2026-10-19"));
        assert!(html.contains(r#"<span class="big" id="treats">4</span>"#));
        assert!(html.contains("50 steps available to convert"));
        assert!(!html.contains("{{"));
    }
}
