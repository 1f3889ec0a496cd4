use crate::view::ViewId;

pub fn render_index(today: &str, rate: f64, view: ViewId) -> String {
    INDEX_HTML
        .replace("{{TODAY}}", today)
        .replace("{{VIEW}}", &view.to_string())
        .replace("{{RATE}}", &format!("{rate:.2}"))
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Charge Log</title>
  <style>
    @import url('https://fonts.googleapis.com/css2?family=Space+Grotesk:wght@400;500;600&family=Fraunces:wght@600&display=swap');

    :root {
      --bg-1: #0b1020;
      --bg-2: #1b2a4a;
      --ink: #e8eefc;
      --muted: #93a0bd;
      --accent: #ffd84a;
      --accent-2: #7fb4ff;
      --card: rgba(18, 26, 46, 0.86);
      --shadow: 0 24px 60px rgba(0, 0, 0, 0.45);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: radial-gradient(circle at top, var(--bg-2), transparent 60%),
        linear-gradient(160deg, var(--bg-1), #111a33 60%, #070b16 100%);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: center;
      padding: 32px 18px 48px;
      overflow-x: hidden;
    }

    .app {
      position: relative;
      z-index: 2;
      width: min(620px, 100%);
      background: var(--card);
      backdrop-filter: blur(12px);
      border-radius: 28px;
      box-shadow: var(--shadow);
      padding: 36px;
      display: grid;
      gap: 28px;
      animation: rise 600ms ease;
    }

    header {
      display: flex;
      flex-direction: column;
      gap: 6px;
    }

    h1 {
      font-family: "Fraunces", "Georgia", serif;
      font-weight: 600;
      font-size: clamp(2rem, 4vw, 2.6rem);
      margin: 0;
    }

    h2 {
      margin: 0 0 12px;
      font-size: 1.1rem;
    }

    .subtitle {
      margin: 0;
      color: var(--muted);
    }

    form {
      display: grid;
      gap: 12px;
    }

    label {
      display: grid;
      gap: 6px;
      font-size: 0.9rem;
      color: var(--muted);
    }

    input {
      font: inherit;
      padding: 10px 14px;
      border-radius: 12px;
      border: 1px solid rgba(127, 180, 255, 0.3);
      background: rgba(7, 11, 22, 0.6);
      color: var(--ink);
    }

    .row {
      display: grid;
      grid-template-columns: 1fr 1fr;
      gap: 12px;
    }

    button {
      font: inherit;
      font-weight: 600;
      border: none;
      border-radius: 14px;
      padding: 12px 18px;
      cursor: pointer;
      background: var(--accent);
      color: #1a1400;
      transition: transform 150ms ease;
    }

    button.secondary {
      background: var(--accent-2);
      color: #06122a;
    }

    button:active {
      transform: scale(0.97);
    }

    .confirm {
      color: var(--accent);
      font-weight: 600;
      opacity: 0;
      transition: opacity 200ms ease;
    }

    .confirm.show {
      opacity: 1;
    }

    .status {
      min-height: 1.2em;
      font-size: 0.9rem;
      color: var(--muted);
    }

    .status.error {
      color: #ff7a7a;
    }

    pre.totals {
      margin: 12px 0 0;
      padding: 14px;
      border-radius: 12px;
      background: rgba(7, 11, 22, 0.6);
      white-space: pre-wrap;
      word-break: break-word;
      font-size: 0.85rem;
    }

    .strobe {
      position: fixed;
      inset: 0;
      z-index: 1;
      pointer-events: none;
      background: rgba(220, 235, 255, 0.35);
      opacity: 0;
      transition: opacity 60ms linear;
    }

    .strobe.on {
      opacity: 1;
    }

    .sparks {
      position: fixed;
      inset: 0;
      z-index: 3;
      pointer-events: none;
      opacity: 0;
      background-image: radial-gradient(2px 2px at 20% 30%, #fff, transparent),
        radial-gradient(2px 2px at 70% 20%, #ffd84a, transparent),
        radial-gradient(3px 3px at 40% 70%, #7fb4ff, transparent),
        radial-gradient(2px 2px at 85% 60%, #fff, transparent),
        radial-gradient(2px 2px at 10% 80%, #ffd84a, transparent);
      transition: opacity 120ms ease;
    }

    .sparks.on {
      opacity: 1;
      animation: flicker 140ms steps(2) infinite;
    }

    .bolt-layer {
      position: fixed;
      inset: 0;
      z-index: 1;
      pointer-events: none;
      display: grid;
      place-items: center;
      opacity: 0;
      transition: opacity 300ms ease-out;
    }

    .bolt-layer.on {
      opacity: 1;
      transition: none;
    }

    .bolt-layer svg {
      max-height: 100vh;
    }

    @keyframes rise {
      from { opacity: 0; transform: translateY(12px); }
      to { opacity: 1; transform: translateY(0); }
    }

    @keyframes flicker {
      from { filter: brightness(1); }
      to { filter: brightness(1.8); }
    }
  </style>
</head>
<body>
  <div class="strobe" id="strobe"></div>
  <div class="bolt-layer" id="bolt"></div>
  <div class="sparks" id="sparks"></div>

  <main class="app" id="app" data-view="{{VIEW}}">
    <header>
      <h1>Charge Log</h1>
      <p class="subtitle">Log each charging session. Rate: ${{RATE}}/kWh.</p>
    </header>

    <section>
      <h2>Log a charge</h2>
      <form id="charge-form">
        <div class="row">
          <label>kWh
            <input id="kwh" type="number" step="0.01" placeholder="e.g. 5.2" required />
          </label>
          <label>Date
            <input id="date" type="date" value="{{TODAY}}" required />
          </label>
        </div>
        <button type="submit">Log charge</button>
        <span class="confirm" id="confirm">&#9889; Charge logged!</span>
      </form>
    </section>

    <section>
      <h2>Totals</h2>
      <form id="history-form">
        <div class="row">
          <label>From
            <input id="start" type="date" />
          </label>
          <label>To
            <input id="end" type="date" />
          </label>
        </div>
        <button type="submit" class="secondary">Fetch totals</button>
      </form>
      <pre class="totals" id="totals" hidden></pre>
    </section>

    <div class="status" id="status" role="status"></div>
  </main>

  <script>
    const strobeEl = document.getElementById('strobe');
    const sparksEl = document.getElementById('sparks');
    const boltEl = document.getElementById('bolt');
    const confirmEl = document.getElementById('confirm');
    const statusEl = document.getElementById('status');
    const totalsEl = document.getElementById('totals');
    const kwhEl = document.getElementById('kwh');
    const dateEl = document.getElementById('date');

    const viewId = Number(document.getElementById('app').dataset.view);
    let lastSvg = null;
    let pollTimer = null;

    const setStatus = (message, tone) => {
      statusEl.textContent = message;
      statusEl.className = `status ${tone || ''}`;
    };

    const renderEffects = (fx) => {
      strobeEl.classList.toggle('on', fx.strobe_active);
      sparksEl.classList.toggle('on', fx.show_sparks);
      confirmEl.classList.toggle('show', fx.confirmation_visible);
      if (fx.bolt_svg !== lastSvg) {
        lastSvg = fx.bolt_svg;
        boltEl.innerHTML = fx.bolt_svg || '';
      }
      boltEl.classList.toggle('on', fx.bolt_visible);
    };

    const poll = async () => {
      try {
        const res = await fetch(`/api/effects?view=${viewId}`);
        if (res.ok) {
          renderEffects(await res.json());
        }
      } catch (_) {
        // Effects are cosmetic; try again next tick.
      }
    };

    const setViewActive = async (active) => {
      clearInterval(pollTimer);
      pollTimer = null;
      const res = await fetch('/api/view', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ view: viewId, active })
      });
      if (res.ok) {
        renderEffects(await res.json());
      }
      if (active) {
        pollTimer = setInterval(poll, 60);
      }
    };

    document.addEventListener('visibilitychange', () => {
      setViewActive(document.visibilityState === 'visible').catch(() => {});
    });

    document.getElementById('charge-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const kwh = parseFloat(kwhEl.value);
      if (!kwh || !dateEl.value) {
        return;
      }
      setStatus('Saving...', 'info');
      try {
        const res = await fetch('/api/charge', {
          method: 'POST',
          headers: { 'content-type': 'application/json' },
          body: JSON.stringify({ kwh, date: dateEl.value, view: viewId })
        });
        if (!res.ok) {
          const msg = await res.text();
          throw new Error(msg || 'Request failed, not logged');
        }
        const body = await res.json();
        renderEffects(body.effects);
        kwhEl.value = '';
        setStatus(`Logged ${body.kwh} kWh on ${body.date}`, 'ok');
      } catch (err) {
        setStatus(err.message || 'Request failed, not logged', 'error');
      }
    });

    document.getElementById('history-form').addEventListener('submit', async (event) => {
      event.preventDefault();
      const params = new URLSearchParams({
        start: document.getElementById('start').value,
        end: document.getElementById('end').value
      });
      try {
        const res = await fetch(`/api/history?${params}`);
        if (!res.ok) {
          const msg = await res.text();
          throw new Error(msg || 'Unable to load totals');
        }
        const body = await res.json();
        totalsEl.textContent = typeof body.data === 'string'
          ? body.data
          : JSON.stringify(body.data, null, 2);
        totalsEl.hidden = false;
        setStatus('', '');
      } catch (err) {
        setStatus(err.message, 'error');
      }
    });

    setViewActive(document.visibilityState === 'visible').catch((err) => setStatus(err.message, 'error'));
  </script>
</body>
</html>
"#;
