//! Lesson prose, code examples and concept explanations.

pub const WELCOME: &str = r#"
🎉 **Welcome to Django Girls Tutorial Offline!** 🎉

We are happy to see you here! :) In this tutorial, we will take you on a journey under the hood of web technologies, offering you a glimpse of all the bits and pieces that need to come together to make the web work as we know it.

As with all unknown things, this is going to be an adventure - but no worries, since you already worked up the courage to be here, you'll be just fine! :)

**What we'll build together:**

A personal blog! By the end, you'll have your very own blog running on your computer where you can write posts, edit them, and share your thoughts with the world.

**Our journey:**
1. 🐍 **Python basics** - Let's write some code! (No programming experience needed)
2. 🛠️ **Setup environment** - Prepare your computer for coding
3. 📦 **Install Django** - Get the Django web framework
4. 🏗️ **Create project** - Create the foundation
5. 📝 **Build blog app** - Create the blog application
6. 🎨 **Make it beautiful** - Add HTML templates
7. 🚀 **See it live** - Run your blog locally!

**Ready to start?**

• If you're completely new to programming, type in **"learn Python basics"** to start with Python basics.
• If you're ready to jump into Django setup, say **"setup"**, or type the number of the step you want to start with.

Let's create something amazing together!
"#;

pub const PYTHON_BASICS: &str = r#"
🐍 **Python Basics - Let's code!**

Programming might seem scary, but it's really just giving instructions to your computer. Think of it like writing a recipe - you tell the computer step by step what to do!

Open a new terminal and type **python3**. This opens a **code interpreter**.

**🧮 Python as a Calculator**

Try typing these one at a time (press Enter after each):
```python
>>> 2 + 3
>>> 4 * 5
>>> 10 / 2
>>> 2 ** 3  # This means 2 to the power of 3
```

**📝 Text (Strings)**

```python
>>> "Your Name Here"
>>> "Hello " + "World"
>>> "Python" * 3  # This repeats the text 3 times!
```

Quotes tell Python "this is text, not math." We call text in programming a "string".

**💾 Variables (Storing Things)**

```python
>>> name = "Django Girl"
>>> print(name)
```

The `=` sign doesn't mean "equals" here - it means "put this value in this box."

**📋 Lists (Multiple Things)**

```python
>>> favorite_colors = ["blue", "green", "purple"]
>>> print(favorite_colors[0])  # We start counting at 0!
>>> favorite_colors.append("red")
```

**🔄 Loops**

```python
>>> friends = ["Alice", "Bob", "Carol"]
>>> for friend in friends:
...     print("Hello " + friend + "!")
```

**Try these yourself!** Make mistakes - that's how we learn!

**Need help?** Ask me anything like "What's a variable?" or "How do loops work?"

Ready for Django? Type 'setup'."#;

pub const SETUP: &str = r#"
🛠️ **Environment Setup**

1. Check Python: `python3 --version`
2. Create project folder: `mkdir djangogirls-blog && cd djangogirls-blog`
3. Create virtual environment: `python3 -m venv blog_env`
4. Activate it: `source blog_env/bin/activate` (Mac/Linux) or `blog_env\Scripts\activate` (Windows)
5. Upgrade pip: `python -m pip install --upgrade pip`

See (blog_env) in terminal? Success! Next: tutorial.show('django_install')"#;

pub const DJANGO_INSTALL: &str = r#"📦 **Installing Django**

Run: `pip install django`
Check: `python -m django --version`

Success? Let's create the project: tutorial.show('create_project')"#;

pub const CREATE_PROJECT: &str = r#"🏗️ **Create Django Project**

Run: `django-admin startproject mysite .`
Test: `python manage.py runserver`
Visit: http://127.0.0.1:8000

See the rocket? 🚀 Stop server (Ctrl+C) and continue: tutorial.show('create_app')"#;

pub const CREATE_APP: &str = r#"📝 **Create Blog App**

Run: `python manage.py startapp blog`

Add to `mysite/settings.py` INSTALLED_APPS:
`'blog',`

Next, create the Post model: tutorial.show('models')"#;

pub const MODELS: &str = r#"📋 **Create Post Model**

Replace `blog/models.py` with: tutorial.show('models_code')

Then:
1. `python manage.py makemigrations blog`
2. `python manage.py migrate`

Ready for admin? tutorial.show('admin')"#;

pub const ADMIN: &str = r#"👤 **Setup Admin**

1. Update `blog/admin.py`: tutorial.show('admin_code')
2. Create superuser: `python manage.py createsuperuser`
3. Run server: `python manage.py runserver`
4. Visit: http://127.0.0.1:8000/admin/

Add some posts! Then: tutorial.show('views')"#;

pub const VIEWS: &str = r#"🎨 **Create Views & Templates**

1. Update `blog/views.py`: tutorial.show('views_code')
2. Create `blog/urls.py`: tutorial.show('urls_code')
3. Create template folder: `mkdir -p blog/templates/blog`
4. Create template: tutorial.show('template_code')
5. Update main `urls.py` to include `blog.urls`

Ready to test? tutorial.show('test')"#;

pub const TEST: &str = r#"🚀 **Test Your Blog!**

Run: `python manage.py runserver`
Visit: http://127.0.0.1:8000

🎉 **CONGRATULATIONS!** You built a Django blog!

Need help with errors? tutorial.help('your error message')
Want the next steps? tutorial.next_step()"#;

pub const MODELS_CODE: &str = r#"from django.db import models
from django.utils import timezone
from django.contrib.auth.models import User

class Post(models.Model):
    author = models.ForeignKey(User, on_delete=models.CASCADE)
    title = models.CharField(max_length=200)
    text = models.TextField()
    created_date = models.DateTimeField(default=timezone.now)
    published_date = models.DateTimeField(blank=True, null=True)

    def publish(self):
        self.published_date = timezone.now()
        self.save()

    def __str__(self):
        return self.title"#;

pub const VIEWS_CODE: &str = r#"from django.shortcuts import render
from django.utils import timezone
from .models import Post

def post_list(request):
    posts = Post.objects.filter(published_date__lte=timezone.now()).order_by('published_date')
    return render(request, 'blog/post_list.html', {'posts': posts})"#;

pub const URLS_CODE: &str = r#"from django.urls import path
from . import views

urlpatterns = [
    path('', views.post_list, name='post_list'),
]"#;

pub const TEMPLATE_CODE: &str = r#"<!DOCTYPE html>
<html>
<head>
    <title>Django Girls Blog</title>
    <style>
        body { font-family: Georgia; margin: 40px; background: #fafafa; }
        .header { background: #ff9400; padding: 20px 40px; color: white; }
        .post { margin-bottom: 30px; padding: 20px; background: white;
                border-left: 5px solid #ff9400; }
    </style>
</head>
<body>
    <header class="header"><h1>Django Girls Blog</h1></header>
    <main>
        {% for post in posts %}
            <article class="post">
                <h2>{{ post.title }}</h2>
                <p>{{ post.text|linebreaksbr }}</p>
            </article>
        {% empty %}
            <p>No posts yet!</p>
        {% endfor %}
    </main>
</body>
</html>"#;

pub const ADMIN_CODE: &str = r#"from django.contrib import admin
from .models import Post

admin.site.register(Post)"#;

pub const VARIABLE: &str = r#"
**Variables - Your Computer's Memory Boxes 📦**

Imagine your computer's memory like a giant warehouse with labeled boxes. A variable is like putting a label on a box so you can find what you stored there later!

```python
>>> name = "Sarah"        # Put "Sarah" in a box labeled "name"
>>> favorite_number = 42  # Put 42 in a box labeled "favorite_number"
>>> print(name)
Sarah
```

**Why use variables?**
- You don't have to remember the actual value - just the name!
- You can change what's in the box anytime
- You can use the same value multiple times without retyping it
"#;

pub const FUNCTION: &str = r#"
**Functions - Your Code Recipes 👩‍🍳**

A function is like a recipe that you can use over and over! Once you write the recipe, you can "cook" it anytime.

```python
>>> def greet_person(name):
...     print("Hello " + name + "!")

>>> greet_person("Alice")
Hello Alice!
```

**Why functions are amazing:**
- Write once, use many times
- If you need to change how greetings work, you only change it in one place
"#;

pub const LOOP: &str = r#"
**Loops - Doing Things Again and Again 🔄**

A loop tells the computer to repeat something for every item in a collection, so you don't have to write the same line over and over.

```python
>>> for number in range(3):
...     print("Round", number)
Round 0
Round 1
Round 2
```

Notice the indentation: everything indented under the `for` line is repeated.
"#;

pub const LIST: &str = r#"
**Lists - Holding Things in Order 📋**

A list keeps many values in a single variable, in the order you put them there.

```python
>>> lottery = [3, 42, 12, 19, 30, 59]
>>> len(lottery)
6
>>> lottery.sort()
>>> lottery[0]
3
```

Counting starts at 0, so `lottery[0]` is the first item.
"#;

pub const STRING: &str = r#"
**Strings - Text the Computer Understands 📝**

A string is a sequence of characters wrapped in quotes.

```python
>>> "Ola".upper()
'OLA'
>>> len("Django")
6
>>> "Hi " + "there!"
'Hi there!'
```

Single and double quotes both work, as long as you open and close with the same one.
"#;

pub const ERROR: &str = r#"
**Errors - Your Computer Asking for Help 🆘**

Don't panic when you see errors! They're like your computer saying "I don't understand, can you help me?"

**NameError** - "I don't know what that word means"
```python
>>> print(nme)  # Oops, typo!
NameError: name 'nme' is not defined
```

**TypeError** - "You're asking me to do something impossible"
```python
>>> "hello" + 5
TypeError: can only concatenate str (not "int") to str
```

**SyntaxError** - "Your grammar is wrong"
```python
>>> if 5 > 2
SyntaxError: invalid syntax
```

**Remember:** Every programmer sees errors all day long. They're learning opportunities!
"#;

pub const CONCEPT_LISTING: &str = r#"
I'd love to help explain that concept! Here are the programming concepts I can explain in simple terms:

• **variable** - storing information in labeled boxes
• **function** - reusable code recipes
• **loop** - making the computer repeat tasks
• **list** - holding multiple items in order
• **string** - text that computers understand
• **error** - when something goes wrong (and how to fix it!)

Just ask me something like "explain variables" or "what are functions?"
"#;

pub const HELP_VIRTUALENV: &str = "Virtual environment not active! Run: source blog_env/bin/activate (Mac/Linux) or blog_env\\Scripts\\activate (Windows)";

pub const HELP_MIGRATIONS: &str =
    "Run migrations: python manage.py makemigrations && python manage.py migrate";

pub const HELP_TEMPLATE: &str = "Check template path: blog/templates/blog/post_list.html";

pub const HELP_GENERIC: &str =
    "Describe your error and I'll help! Common issues: virtual env, migrations, templates";

pub const TUTORIAL_COMPLETE: &str = "You've completed the tutorial! 🎉";
