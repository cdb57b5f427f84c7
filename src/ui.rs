use crate::history::{escape_html, HistoryRange};
use crate::models::Dashboard;

const RANGE_CHOICES: [(&str, &str, HistoryRange); 3] = [
    ("7", "Last 7", HistoryRange::Recent(7)),
    ("30", "Last 30", HistoryRange::Recent(30)),
    ("all", "All", HistoryRange::All),
];

pub fn render_index(dashboard: &Dashboard, range: HistoryRange) -> String {
    INDEX_HTML
        .replace("{{STATS}}", &dashboard.stats_html)
        .replace("{{SPARKLINE}}", &dashboard.sparkline_svg)
        .replace("{{HISTORY}}", &dashboard.history_html)
        .replace("{{RANGE_OPTIONS}}", &range_options(range))
        .replace("{{ACTIVITIES}}", &activity_chips(&dashboard.activities))
}

fn range_options(current: HistoryRange) -> String {
    RANGE_CHOICES
        .iter()
        .map(|(value, label, range)| {
            let selected = if *range == current { " selected" } else { "" };
            format!(r#"<option value="{value}"{selected}>{label}</option>"#)
        })
        .collect()
}

fn activity_chips(activities: &[String]) -> String {
    activities
        .iter()
        .map(|label| {
            let label = escape_html(label);
            format!(r#"<button class="chip" type="button" data-label="{label}">{label}</button>"#)
        })
        .collect()
}

const INDEX_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>Mood Check-in</title>
  <style>
    :root {
      --bg: #f4f1fb;
      --ink: #28243a;
      --muted: #8a84a3;
      --accent: #6c5ce7;
      --card: #ffffff;
      --shadow: 0 18px 48px rgba(108, 92, 231, 0.14);
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: linear-gradient(160deg, var(--bg), #fdfbff 70%);
      color: var(--ink);
      font-family: "Inter", "Segoe UI", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 16px 48px;
    }

    .app {
      width: min(760px, 100%);
      display: grid;
      gap: 20px;
    }

    .card {
      background: var(--card);
      border-radius: 22px;
      box-shadow: var(--shadow);
      padding: 24px;
      display: grid;
      gap: 16px;
    }

    h1, h2 {
      margin: 0;
    }

    .muted {
      color: var(--muted);
    }

    .moods {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    .mood {
      font-size: 2rem;
      border: 2px solid transparent;
      border-radius: 16px;
      background: #f5f3ff;
      padding: 8px 12px;
      cursor: pointer;
    }

    .mood[aria-pressed="true"] {
      border-color: var(--accent);
      background: #ece8ff;
    }

    textarea {
      width: 100%;
      min-height: 80px;
      border-radius: 14px;
      border: 1px solid #ddd8f3;
      padding: 12px;
      font: inherit;
    }

    .actions {
      display: flex;
      gap: 10px;
      flex-wrap: wrap;
    }

    button.primary,
    button.secondary {
      border: none;
      border-radius: 999px;
      padding: 12px 20px;
      font-weight: 600;
      cursor: pointer;
    }

    button.primary {
      background: var(--accent);
      color: white;
    }

    button.secondary {
      background: #ece8ff;
      color: var(--ink);
    }

    button:disabled {
      opacity: 0.5;
      cursor: not-allowed;
    }

    .chips {
      display: flex;
      flex-wrap: wrap;
      gap: 8px;
    }

    .chip {
      border: 1px solid #ddd8f3;
      border-radius: 999px;
      background: white;
      padding: 6px 12px;
      cursor: pointer;
    }

    .stats {
      display: grid;
      grid-template-columns: repeat(auto-fit, minmax(140px, 1fr));
      gap: 12px;
    }

    .stat {
      border-radius: 16px;
      background: #f8f6ff;
      padding: 14px;
    }

    .stat span {
      display: block;
    }

    .stat .label {
      font-size: 0.8rem;
      text-transform: uppercase;
      letter-spacing: 0.1em;
      color: var(--muted);
    }

    .stat .value {
      font-size: 1.6rem;
      font-weight: 600;
    }

    .spark-line {
      fill: none;
      stroke: var(--accent);
      stroke-width: 2;
    }

    .spark-point {
      fill: white;
      stroke: var(--accent);
      stroke-width: 1.5;
    }

    #historyList {
      list-style: none;
      margin: 0;
      padding: 0;
      display: grid;
      gap: 10px;
    }

    #historyList li {
      display: flex;
      justify-content: space-between;
      gap: 12px;
      padding: 10px 0;
      border-bottom: 1px solid #f0edf9;
    }

    .ai-loading {
      display: flex;
      align-items: center;
      gap: 10px;
      color: var(--muted);
    }

    .spinner {
      width: 16px;
      height: 16px;
      border-radius: 50%;
      border: 2px solid #ddd8f3;
      border-top-color: var(--accent);
      animation: spin 800ms linear infinite;
    }

    .ai-message {
      background: #f8f6ff;
      border-radius: 16px;
      padding: 14px 16px;
    }

    @keyframes spin {
      to {
        transform: rotate(360deg);
      }
    }
  </style>
</head>
<body>
  <main class="app">
    <section class="card">
      <h1>How are you feeling?</h1>
      <div class="moods">
        <button class="mood" type="button" data-value="1" aria-pressed="false" title="very low">😞</button>
        <button class="mood" type="button" data-value="2" aria-pressed="false" title="low">😕</button>
        <button class="mood" type="button" data-value="3" aria-pressed="false" title="neutral">😐</button>
        <button class="mood" type="button" data-value="4" aria-pressed="false" title="good">🙂</button>
        <button class="mood" type="button" data-value="5" aria-pressed="false" title="great">😄</button>
      </div>
      <textarea id="note" placeholder="Anything on your mind? (optional)"></textarea>
      <div id="recommendations">
        <p class="muted">Quick activities</p>
        <div class="chips">{{ACTIVITIES}}</div>
      </div>
      <div class="actions">
        <button class="primary" id="saveBtn" type="button">Save check-in</button>
        <button class="secondary" id="clearBtn" type="button">Clear</button>
      </div>
      <div id="ai-container"></div>
    </section>

    <section class="card">
      <h2>Your stats</h2>
      <div class="stats" id="statsPanel">{{STATS}}</div>
      <div id="sparkline">{{SPARKLINE}}</div>
    </section>

    <section class="card">
      <div class="actions">
        <h2>History</h2>
        <select id="historyRange">{{RANGE_OPTIONS}}</select>
        <button class="secondary" id="exportBtn" type="button">Export CSV</button>
        <button class="secondary" id="clearAllBtn" type="button">Clear all</button>
      </div>
      <ul id="historyList">{{HISTORY}}</ul>
    </section>
  </main>

  <script>
    const moods = Array.from(document.querySelectorAll('.mood'));
    const noteEl = document.getElementById('note');
    const saveBtn = document.getElementById('saveBtn');
    const clearBtn = document.getElementById('clearBtn');
    const statsPanel = document.getElementById('statsPanel');
    const sparkEl = document.getElementById('sparkline');
    const historyList = document.getElementById('historyList');
    const historyRange = document.getElementById('historyRange');
    const exportBtn = document.getElementById('exportBtn');
    const clearAllBtn = document.getElementById('clearAllBtn');
    const aiContainer = document.getElementById('ai-container');
    const chipsEl = document.querySelector('#recommendations .chips');

    let selectedMood = null;
    let entryCount = Number(document.getElementById('entriesCount')?.textContent || 0);

    const setControls = (enabled) => {
      saveBtn.disabled = !enabled;
      clearBtn.disabled = !enabled;
    };

    const showLoading = (message) => {
      aiContainer.innerHTML = '<div class="ai-loading"><span class="spinner"></span><span></span></div>';
      aiContainer.querySelector('.ai-loading span:last-child').textContent = message || 'Preparing a response…';
    };

    const showMessage = (message) => {
      const box = document.createElement('div');
      box.className = 'ai-message';
      const p = document.createElement('p');
      p.textContent = message;
      box.appendChild(p);
      aiContainer.innerHTML = '';
      aiContainer.appendChild(box);
    };

    const renderActivities = (labels) => {
      chipsEl.innerHTML = '';
      labels.forEach((label) => {
        const btn = document.createElement('button');
        btn.className = 'chip';
        btn.type = 'button';
        btn.dataset.label = label;
        btn.textContent = label;
        chipsEl.appendChild(btn);
      });
    };

    const applyDashboard = (dashboard) => {
      statsPanel.innerHTML = dashboard.stats_html;
      sparkEl.innerHTML = dashboard.sparkline_svg;
      historyList.innerHTML = dashboard.history_html;
      entryCount = dashboard.stats.count;
      renderActivities(dashboard.activities);
    };

    const query = () => {
      const params = new URLSearchParams({ range: historyRange.value });
      if (selectedMood) {
        params.set('mood', selectedMood);
      }
      return params.toString();
    };

    const refresh = async () => {
      const res = await fetch(`/api/dashboard?${query()}`);
      if (res.ok) {
        applyDashboard(await res.json());
      }
    };

    const resetForm = () => {
      selectedMood = null;
      noteEl.value = '';
      moods.forEach((b) => b.setAttribute('aria-pressed', 'false'));
    };

    const pollFeedback = async () => {
      const res = await fetch('/api/feedback');
      const status = res.ok ? await res.json() : null;
      if (status && !status.controls_enabled) {
        setTimeout(pollFeedback, 500);
        return;
      }
      setControls(true);
      showMessage((status && status.message) || 'AI unavailable right now, but you’re doing great ❤️');
    };

    moods.forEach((btn) => {
      btn.addEventListener('click', async () => {
        selectedMood = Number(btn.dataset.value);
        moods.forEach((b) => b.setAttribute('aria-pressed', 'false'));
        btn.setAttribute('aria-pressed', 'true');
        const res = await fetch(`/api/activities?mood=${selectedMood}`);
        if (res.ok) {
          renderActivities((await res.json()).activities);
        }
      });
    });

    chipsEl.addEventListener('click', async (event) => {
      const label = event.target.dataset && event.target.dataset.label;
      if (!label) {
        return;
      }
      const res = await fetch('/api/activities/apply', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ note: noteEl.value, label })
      });
      if (res.ok) {
        noteEl.value = (await res.json()).note;
      }
    });

    saveBtn.addEventListener('click', async () => {
      if (!selectedMood) {
        alert('Please select your mood (tap an emoji).');
        return;
      }

      setControls(false);
      const res = await fetch('/api/checkin', {
        method: 'POST',
        headers: { 'content-type': 'application/json' },
        body: JSON.stringify({ moodValue: selectedMood, note: noteEl.value, range: historyRange.value })
      }).catch(() => null);

      if (!res || !res.ok) {
        setControls(true);
        const msg = res ? await res.text() : '';
        if (res && res.status === 400) {
          alert(msg);
        } else {
          showMessage(msg || 'Could not save right now.');
        }
        return;
      }

      const data = await res.json();
      resetForm();
      applyDashboard(data.dashboard);
      showLoading(data.feedback.message);
      pollFeedback();
    });

    clearBtn.addEventListener('click', resetForm);

    historyRange.addEventListener('change', () => {
      refresh();
    });

    exportBtn.addEventListener('click', () => {
      if (!entryCount) {
        alert('No entries to export.');
        return;
      }
      window.location.href = '/api/export';
    });

    clearAllBtn.addEventListener('click', async () => {
      if (!confirm('Clear ALL entries? This cannot be undone.')) {
        return;
      }
      await fetch('/api/entries?confirm=true', { method: 'DELETE' });
      refresh();
    });
  </script>
</body>
</html>
"#;
