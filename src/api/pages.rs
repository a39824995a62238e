//! Static chat pages served by the web front end.
//!
//! Both pages keep their session id in tab memory only; reloading the tab
//! starts a new conversation and ends the old one.

/// Two-pane layout: chat on the left, read-only task panel on the right.
pub const PANEL_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Task List Manager</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 1100px; padding: 1rem; }
  .row { display: flex; gap: 1rem; }
  .chat { flex: 2; display: flex; flex-direction: column; }
  .side { flex: 1; display: flex; flex-direction: column; }
  #log { height: 400px; overflow-y: auto; border: 1px solid #ccc; border-radius: 6px; padding: .5rem; }
  .msg { margin: .4rem 0; padding: .4rem .6rem; border-radius: 6px; white-space: pre-wrap; }
  .user { background: #e8f0fe; align-self: flex-end; }
  .bot { background: #f1f3f4; }
  .err { background: #fdecea; color: #8a1c1c; }
  #tasks { height: 400px; resize: none; font-family: inherit; }
  input, button { font-size: 1rem; padding: .5rem; margin-top: .5rem; }
  .stop { background: #d93025; color: #fff; border: none; border-radius: 4px; }
</style>
</head>
<body>
<h1>📝 Task List Manager</h1>
<p>I'm your AI assistant for managing tasks. Ask me to add tasks or view your task list.</p>
<div class="row">
  <div class="chat">
    <label>Conversation</label>
    <div id="log"></div>
    <form id="form">
      <input id="msg" placeholder="Type your message here..." autocomplete="off" style="width:75%">
      <button type="submit" id="send">Send</button>
    </form>
  </div>
  <div class="side">
    <label for="tasks">Current Tasks</label>
    <textarea id="tasks" readonly>No tasks yet.</textarea>
    <button class="stop" id="clear-tasks">Clear All Tasks</button>
  </div>
</div>
<button id="clear-conv">Clear Conversation</button>
<script>
let sessionId = null;
const log = document.getElementById('log');
const tasks = document.getElementById('tasks');
const input = document.getElementById('msg');

async function ensureSession() {
  if (!sessionId) {
    const r = await fetch('/api/sessions', { method: 'POST' });
    sessionId = (await r.json()).id;
  }
  return sessionId;
}

function bubble(text, cls) {
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

async function refreshTasks() {
  const r = await fetch('/api/tasks');
  tasks.value = r.ok ? (await r.json()).display : await r.text();
}

document.getElementById('form').addEventListener('submit', async (e) => {
  e.preventDefault();
  const text = input.value.trim();
  if (!text) return;
  input.value = '';
  bubble(text, 'user');
  const id = await ensureSession();
  let r = await fetch(`/api/sessions/${id}/messages`, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ message: text }),
  });
  if (r.status === 404) {
    sessionId = null;
    bubble('Session expired; starting a new conversation. Please resend.', 'err');
    return;
  }
  if (!r.ok) { bubble(await r.text(), 'err'); return; }
  const body = await r.json();
  if (body.reply) bubble(body.reply, 'bot'); else bubble(body.error, 'err');
  tasks.value = body.tasks;
});

document.getElementById('clear-tasks').addEventListener('click', async () => {
  const r = await fetch('/api/tasks', { method: 'DELETE' });
  tasks.value = r.ok ? (await r.json()).display : await r.text();
});

document.getElementById('clear-conv').addEventListener('click', async () => {
  if (sessionId) await fetch(`/api/sessions/${sessionId}/history`, { method: 'DELETE' });
  log.innerHTML = '';
  await refreshTasks();
});

refreshTasks();

window.addEventListener('pagehide', () => {
  if (sessionId) fetch(`/api/sessions/${sessionId}`, { method: 'DELETE', keepalive: true });
});
</script>
</body>
</html>
"#;

/// Single-pane chat with example prompts and no task panel.
pub const CHAT_PAGE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Task List Manager</title>
<style>
  body { font-family: system-ui, sans-serif; margin: 0 auto; max-width: 720px; padding: 1rem; }
  #log { height: 460px; overflow-y: auto; border: 1px solid #ccc; border-radius: 6px; padding: .5rem; }
  .msg { margin: .4rem 0; padding: .4rem .6rem; border-radius: 6px; white-space: pre-wrap; }
  .user { background: #e8f0fe; }
  .bot { background: #f1f3f4; }
  .err { background: #fdecea; color: #8a1c1c; }
  input, button { font-size: 1rem; padding: .5rem; margin-top: .5rem; }
  .example { font-size: .85rem; margin-right: .3rem; }
</style>
</head>
<body>
<h1>Task List Manager</h1>
<p>I'm your AI assistant for managing tasks. Ask me to add tasks or view your task list.</p>
<div id="log"></div>
<form id="form">
  <input id="msg" placeholder="Type a message..." autocomplete="off" style="width:80%">
  <button type="submit">Submit</button>
</form>
<div>
  <button class="example">Add a task: Buy groceries</button>
  <button class="example">Show me my tasks</button>
  <button class="example">Add a task: Finish report by Friday</button>
</div>
<script>
let sessionId = null;
const log = document.getElementById('log');
const input = document.getElementById('msg');

function bubble(text, cls) {
  const div = document.createElement('div');
  div.className = 'msg ' + cls;
  div.textContent = text;
  log.appendChild(div);
  log.scrollTop = log.scrollHeight;
}

async function send(text) {
  if (!sessionId) {
    const r = await fetch('/api/sessions', { method: 'POST' });
    sessionId = (await r.json()).id;
  }
  bubble(text, 'user');
  const r = await fetch(`/api/sessions/${sessionId}/messages`, {
    method: 'POST',
    headers: { 'Content-Type': 'application/json' },
    body: JSON.stringify({ message: text }),
  });
  if (r.status === 404) { sessionId = null; bubble('Session expired; please resend.', 'err'); return; }
  if (!r.ok) { bubble(await r.text(), 'err'); return; }
  const body = await r.json();
  if (body.reply) bubble(body.reply, 'bot'); else bubble(body.error, 'err');
}

document.getElementById('form').addEventListener('submit', (e) => {
  e.preventDefault();
  const text = input.value.trim();
  if (!text) return;
  input.value = '';
  send(text);
});

document.querySelectorAll('.example').forEach((b) =>
  b.addEventListener('click', () => send(b.textContent)));

window.addEventListener('pagehide', () => {
  if (sessionId) fetch(`/api/sessions/${sessionId}`, { method: 'DELETE', keepalive: true });
});
</script>
</body>
</html>
"#;
