//! Embedded HTML/CSS/JS frontend for the insightdash web dashboard.
//!
//! The entire SPA is compiled into the binary as a string constant.
//! No external assets, no build tools, no CDN dependencies. Charts are drawn
//! as inline SVG from the result's `data` records.

/// The complete single-page dashboard HTML.
pub const INDEX_HTML: &str = r##"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>insightdash</title>
<style>
:root {
  --bg: #0d1117;
  --surface: #161b22;
  --border: #30363d;
  --text: #e6edf3;
  --text-muted: #8b949e;
  --accent: #58a6ff;
  --green: #3fb950;
  --yellow: #d29922;
  --red: #f85149;
  --purple: #bc8cff;
  --cyan: #39d2c0;
  --radius: 8px;
  --font: -apple-system, BlinkMacSystemFont, 'Segoe UI', Helvetica, Arial, sans-serif;
  --mono: 'SF Mono', 'Cascadia Code', 'Fira Code', monospace;
}

* { margin: 0; padding: 0; box-sizing: border-box; }
body {
  background: var(--bg);
  color: var(--text);
  font-family: var(--font);
  font-size: 14px;
  line-height: 1.5;
}

.app {
  max-width: 1200px;
  margin: 0 auto;
  padding: 24px;
  display: grid;
  grid-template-columns: 1fr 280px;
  gap: 16px;
}

header {
  grid-column: 1 / -1;
  display: flex;
  align-items: center;
  justify-content: space-between;
  padding-bottom: 16px;
  border-bottom: 1px solid var(--border);
}

header h1 { font-size: 24px; font-weight: 600; }
header h1 .logo { color: var(--accent); font-family: var(--mono); font-weight: 700; }
header .subtitle { color: var(--text-muted); font-size: 13px; }

.badge {
  display: inline-flex;
  align-items: center;
  padding: 4px 10px;
  border-radius: 12px;
  font-size: 12px;
  background: var(--surface);
  border: 1px solid var(--border);
}
.badge.ok { border-color: var(--green); color: var(--green); }
.badge.err { border-color: var(--red); color: var(--red); }

.card {
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: var(--radius);
  padding: 20px;
  margin-bottom: 16px;
}
.card h2 { font-size: 16px; font-weight: 600; margin-bottom: 12px; }

/* Query input */
.query-form { position: relative; display: flex; gap: 8px; }
.query-form input {
  flex: 1;
  padding: 10px 12px;
  background: var(--bg);
  border: 1px solid var(--border);
  border-radius: 6px;
  color: var(--text);
  font-size: 14px;
}
.query-form input:focus { outline: none; border-color: var(--accent); }

.btn {
  padding: 8px 16px;
  border-radius: 6px;
  border: 1px solid var(--border);
  background: var(--surface);
  color: var(--text);
  cursor: pointer;
  font-size: 13px;
}
.btn.primary { background: var(--accent); border-color: var(--accent); color: #fff; }
.btn:disabled { opacity: 0.5; cursor: default; }

.suggestions {
  position: absolute;
  top: 44px;
  left: 0;
  right: 90px;
  background: var(--surface);
  border: 1px solid var(--border);
  border-radius: 6px;
  z-index: 10;
  display: none;
}
.suggestions.open { display: block; }
.suggestions div { padding: 8px 12px; cursor: pointer; }
.suggestions div:hover { background: rgba(88,166,255,0.12); }
.suggestions .pending { color: var(--text-muted); cursor: default; }

/* Tabs */
.tabs {
  display: flex;
  gap: 4px;
  margin-bottom: 16px;
  background: var(--bg);
  border-radius: var(--radius);
  padding: 4px;
}
.tabs button {
  flex: 1;
  padding: 6px 12px;
  border: none;
  border-radius: 6px;
  background: transparent;
  color: var(--text-muted);
  cursor: pointer;
}
.tabs button.active { background: var(--accent); color: #fff; }

.empty { color: var(--text-muted); text-align: center; padding: 40px 0; }
.error-panel { border-color: var(--red); color: var(--red); }
.spinner {
  width: 28px; height: 28px;
  border: 3px solid var(--border);
  border-top-color: var(--accent);
  border-radius: 50%;
  margin: 0 auto 12px;
  animation: spin 0.8s linear infinite;
}
@keyframes spin { to { transform: rotate(360deg); } }

table { width: 100%; border-collapse: collapse; }
th, td { text-align: left; padding: 6px 8px; border-bottom: 1px solid var(--border); }
th { color: var(--text-muted); font-weight: 500; }
td.num { text-align: right; font-family: var(--mono); }

ul.insights { padding-left: 20px; }
ul.insights li { margin-bottom: 6px; }

.history-item {
  padding: 8px 0;
  border-bottom: 1px solid var(--border);
  cursor: pointer;
}
.history-item:hover .q { color: var(--accent); }
.history-item .when { color: var(--text-muted); font-size: 12px; }

.legend { display: flex; gap: 12px; flex-wrap: wrap; margin-top: 8px; font-size: 12px; }
.legend span::before {
  content: '';
  display: inline-block;
  width: 10px; height: 10px;
  margin-right: 4px;
  background: var(--swatch);
}

.toast {
  position: fixed;
  bottom: 24px;
  right: 24px;
  padding: 10px 16px;
  border-radius: 6px;
  background: var(--surface);
  border: 1px solid var(--green);
  opacity: 0;
  transition: opacity 0.2s;
}
.toast.show { opacity: 1; }
.toast.error { border-color: var(--red); }
</style>
</head>
<body>
<div class="app">
  <header>
    <div>
      <h1><span class="logo">insight</span>dash</h1>
      <div class="subtitle">Ask a business question, get a chart and insights</div>
    </div>
    <div id="health"></div>
  </header>

  <main>
    <div class="card">
      <form class="query-form" id="query-form" autocomplete="off">
        <input id="query-input" placeholder="e.g. What were our top products last quarter?">
        <button class="btn primary" id="submit-btn" type="submit">Analyze</button>
        <div class="suggestions" id="suggestions"></div>
      </form>
    </div>
    <div class="card" id="panel"></div>
  </main>

  <aside>
    <div class="card">
      <h2>History</h2>
      <div id="history"><div class="empty">No queries yet</div></div>
    </div>
  </aside>
</div>

<div class="toast" id="toast"></div>

<script>
// ---------------------------------------------------------------------------
// State
// ---------------------------------------------------------------------------
let activeTab = 'summary';
let lastResponse = null;
let suggestTimer = null;
let stateTimer = null;
const COLORS = ['#58a6ff', '#3fb950', '#d29922', '#bc8cff', '#39d2c0', '#f85149'];

// ---------------------------------------------------------------------------
// API helpers
// ---------------------------------------------------------------------------
async function api(method, path, body) {
  const opts = { method, headers: {} };
  if (body) {
    opts.headers['Content-Type'] = 'application/json';
    opts.body = JSON.stringify(body);
  }
  const res = await fetch(path, opts);
  const json = await res.json();
  if (!res.ok) throw new Error(json.error || res.statusText);
  return json;
}

function toast(msg, isError) {
  const el = document.getElementById('toast');
  el.textContent = msg;
  el.className = 'toast show' + (isError ? ' error' : '');
  setTimeout(() => el.className = 'toast', 3000);
}

function esc(s) {
  const d = document.createElement('div');
  d.textContent = s == null ? '' : String(s);
  return d.innerHTML;
}

function num(n) {
  return Number(n).toLocaleString();
}

// ---------------------------------------------------------------------------
// Query lifecycle
// ---------------------------------------------------------------------------
async function submitQuery(query) {
  query = query.trim();
  if (!query) return;
  closeSuggestions();
  document.getElementById('query-input').value = query;
  renderPanel({ kind: 'loading', query });
  try {
    render(await api('POST', '/api/query', { query }));
  } catch (e) {
    toast(e.message, true);
    render(await api('GET', '/api/state'));
  }
}

// The server answers POST /api/query with the Loading state right away;
// poll until the analysis lands.
async function pollState() {
  stateTimer = null;
  try {
    render(await api('GET', '/api/state'));
  } catch (e) {
    toast(e.message, true);
    stateTimer = setTimeout(pollState, 1000);
  }
}

function setBusy(busy) {
  document.getElementById('submit-btn').disabled = busy;
}

function render(resp) {
  lastResponse = resp;
  renderPanel(resp.panel);
  renderHistory(resp.history);
  const loading = resp.state.status === 'loading';
  setBusy(loading);
  if (loading && !stateTimer) stateTimer = setTimeout(pollState, 300);
}

// ---------------------------------------------------------------------------
// Panels
// ---------------------------------------------------------------------------
function renderPanel(panel) {
  const el = document.getElementById('panel');
  el.className = 'card' + (panel.kind === 'error' ? ' error-panel' : '');
  switch (panel.kind) {
    case 'loading':
      el.innerHTML = '<div class="empty"><div class="spinner"></div>Analyzing "' + esc(panel.query) + '"</div>';
      break;
    case 'error':
      el.innerHTML = '<h2>Something went wrong</h2><p>' + esc(panel.message) + '</p>';
      break;
    case 'results':
      renderResults(el, panel.query, panel.result);
      break;
    default:
      el.innerHTML = '<div class="empty">Ask a question to see results</div>';
  }
}

function renderResults(el, query, result) {
  const tabs = ['summary', 'chart', 'table', 'insights'];
  let html = '<h2>' + esc(query) + '</h2><div class="tabs">';
  for (const t of tabs) {
    html += '<button data-tab="' + t + '" class="' + (t === activeTab ? 'active' : '') + '">' +
      t.charAt(0).toUpperCase() + t.slice(1) + '</button>';
  }
  html += '</div><div id="tab-body"></div>';
  el.innerHTML = html;
  el.querySelectorAll('.tabs button').forEach(b => b.addEventListener('click', () => {
    activeTab = b.dataset.tab;
    renderResults(el, query, result);
  }));

  const body = document.getElementById('tab-body');
  switch (activeTab) {
    case 'chart': body.innerHTML = renderChart(result); break;
    case 'table': body.innerHTML = renderTable(result.data); break;
    case 'insights': body.innerHTML = renderInsights(result.insights); break;
    default: body.innerHTML = '<p>' + esc(result.summary) + '</p>';
  }
}

function seriesOf(data) {
  const keys = [];
  for (const row of data) {
    for (const k of Object.keys(row)) {
      if (k !== 'name' && !keys.includes(k)) keys.push(k);
    }
  }
  return keys;
}

function renderTable(data) {
  const keys = seriesOf(data);
  let html = '<table><thead><tr><th>Name</th>';
  for (const k of keys) html += '<th>' + esc(k) + '</th>';
  html += '</tr></thead><tbody>';
  for (const row of data) {
    html += '<tr><td>' + esc(row.name) + '</td>';
    for (const k of keys) html += '<td class="num">' + (row[k] == null ? '' : num(row[k])) + '</td>';
    html += '</tr>';
  }
  return html + '</tbody></table>';
}

function renderInsights(insights) {
  if (!insights.length) return '<div class="empty">No insights</div>';
  return '<ul class="insights">' + insights.map(i => '<li>' + esc(i) + '</li>').join('') + '</ul>';
}

function legend(keys) {
  return '<div class="legend">' + keys.map((k, i) =>
    '<span style="--swatch:' + COLORS[i % COLORS.length] + '">' + esc(k) + '</span>').join('') + '</div>';
}

// ---------------------------------------------------------------------------
// Charts (inline SVG)
// ---------------------------------------------------------------------------
function renderChart(result) {
  const data = result.data;
  const keys = seriesOf(data);
  if (!data.length || !keys.length) return '<div class="empty">No data</div>';
  if (result.chartType === 'pie') return pieChart(data, keys[0]);
  return (result.chartType === 'line' ? lineChart(data, keys) : barChart(data, keys)) + legend(keys);
}

const W = 760, H = 320, PAD = 40;

function maxOf(data, keys) {
  let m = 0;
  for (const row of data) for (const k of keys) m = Math.max(m, row[k] || 0);
  return m || 1;
}

function axes(data, step) {
  let svg = '<line x1="' + PAD + '" y1="' + (H - PAD) + '" x2="' + (W - 10) + '" y2="' + (H - PAD) + '" stroke="#30363d"/>';
  data.forEach((row, i) => {
    const x = PAD + step * i + step / 2;
    svg += '<text x="' + x + '" y="' + (H - PAD + 16) + '" fill="#8b949e" font-size="11" text-anchor="middle">' + esc(row.name) + '</text>';
  });
  return svg;
}

function barChart(data, keys) {
  const max = maxOf(data, keys);
  const step = (W - PAD - 10) / data.length;
  const barW = (step * 0.8) / keys.length;
  let svg = '<svg viewBox="0 0 ' + W + ' ' + H + '" width="100%">' + axes(data, step);
  data.forEach((row, i) => {
    keys.forEach((k, j) => {
      const h = ((row[k] || 0) / max) * (H - PAD * 2);
      const x = PAD + step * i + step * 0.1 + barW * j;
      svg += '<rect x="' + x + '" y="' + (H - PAD - h) + '" width="' + (barW - 2) + '" height="' + h +
        '" fill="' + COLORS[j % COLORS.length] + '"><title>' + esc(k) + ': ' + num(row[k] || 0) + '</title></rect>';
    });
  });
  return svg + '</svg>';
}

function lineChart(data, keys) {
  const max = maxOf(data, keys);
  const step = (W - PAD - 10) / data.length;
  let svg = '<svg viewBox="0 0 ' + W + ' ' + H + '" width="100%">' + axes(data, step);
  keys.forEach((k, j) => {
    const pts = data.map((row, i) =>
      (PAD + step * i + step / 2) + ',' + (H - PAD - ((row[k] || 0) / max) * (H - PAD * 2)));
    svg += '<polyline fill="none" stroke-width="2" stroke="' + COLORS[j % COLORS.length] + '" points="' + pts.join(' ') + '"/>';
  });
  return svg + '</svg>';
}

function pieChart(data, key) {
  const total = data.reduce((s, row) => s + (row[key] || 0), 0) || 1;
  const cx = 160, cy = 160, r = 140;
  let angle = -Math.PI / 2;
  let svg = '<svg viewBox="0 0 320 320" width="320">';
  data.forEach((row, i) => {
    const slice = ((row[key] || 0) / total) * Math.PI * 2;
    const x1 = cx + r * Math.cos(angle), y1 = cy + r * Math.sin(angle);
    angle += slice;
    const x2 = cx + r * Math.cos(angle), y2 = cy + r * Math.sin(angle);
    const large = slice > Math.PI ? 1 : 0;
    svg += '<path d="M' + cx + ',' + cy + ' L' + x1 + ',' + y1 + ' A' + r + ',' + r + ' 0 ' + large + ' 1 ' + x2 + ',' + y2 +
      ' Z" fill="' + COLORS[i % COLORS.length] + '"><title>' + esc(row.name) + ': ' + num(row[key] || 0) + '</title></path>';
  });
  return svg + '</svg>' + legend(data.map(row => row.name));
}

// ---------------------------------------------------------------------------
// History
// ---------------------------------------------------------------------------
function renderHistory(rows) {
  const el = document.getElementById('history');
  if (!rows.length) {
    el.innerHTML = '<div class="empty">No queries yet</div>';
    return;
  }
  el.innerHTML = rows.map((row, i) =>
    '<div class="history-item" data-i="' + i + '"><div class="q">' + esc(row.query) +
    '</div><div class="when">' + esc(row.when) + '</div></div>').join('');
  el.querySelectorAll('.history-item').forEach(item => item.addEventListener('click', () => {
    submitQuery(rows[Number(item.dataset.i)].query);
  }));
}

// ---------------------------------------------------------------------------
// Suggestions
// ---------------------------------------------------------------------------
async function onInput(text) {
  try {
    renderSuggestions(await api('POST', '/api/suggest', { text }));
    if (suggestTimer) clearTimeout(suggestTimer);
    suggestTimer = setTimeout(pollSuggestions, 350);
  } catch (e) {
    closeSuggestions();
  }
}

async function pollSuggestions() {
  suggestTimer = null;
  const snap = await api('GET', '/api/suggest');
  if (snap.input !== document.getElementById('query-input').value) return;
  renderSuggestions(snap);
  if (snap.status === 'pending') suggestTimer = setTimeout(pollSuggestions, 250);
}

function renderSuggestions(snap) {
  const el = document.getElementById('suggestions');
  if (snap.status === 'idle' || (snap.status === 'ready' && !snap.suggestions.length)) {
    closeSuggestions();
    return;
  }
  if (snap.status === 'pending' && !snap.suggestions.length) {
    el.innerHTML = '<div class="pending">Loading suggestions...</div>';
  } else {
    el.innerHTML = snap.suggestions.map(s => '<div>' + esc(s) + '</div>').join('');
    el.querySelectorAll('div').forEach(d => d.addEventListener('mousedown', ev => {
      ev.preventDefault();
      pickSuggestion(d.textContent);
    }));
  }
  el.className = 'suggestions open';
}

function pickSuggestion(text) {
  const input = document.getElementById('query-input');
  input.value = text;
  input.focus();
  closeSuggestions();
}

function closeSuggestions() {
  document.getElementById('suggestions').className = 'suggestions';
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------
async function loadHealth() {
  try {
    const h = await api('GET', '/api/health');
    const ready = h.ollama_reachable === null ? h.api_key_set : h.ollama_reachable;
    document.getElementById('health').innerHTML =
      '<span class="badge ' + (ready ? 'ok' : 'err') + '">' + esc(h.provider) + ' / ' + esc(h.model) + '</span>';
  } catch (e) {
    document.getElementById('health').innerHTML = '<span class="badge err">health unavailable</span>';
  }
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------
const input = document.getElementById('query-input');
input.addEventListener('input', () => onInput(input.value));
input.addEventListener('blur', closeSuggestions);
input.addEventListener('keydown', ev => { if (ev.key === 'Escape') closeSuggestions(); });
document.getElementById('query-form').addEventListener('submit', ev => {
  ev.preventDefault();
  submitQuery(input.value);
});

api('GET', '/api/state').then(render).catch(e => toast(e.message, true));
loadHealth();
</script>
</body>
</html>
"##;
